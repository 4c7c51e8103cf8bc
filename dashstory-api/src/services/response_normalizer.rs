//! Tolerant extraction of structured results from raw model text
//!
//! Strategy order:
//! 1. Structured: the first substring of the raw text that parses as a JSON
//!    object, read with per-key defaults.
//! 2. Task fallback: a deterministic result built from the request itself
//!    (panel count and titles for narration, a recognition-failure notice
//!    for vision).
//! 3. Raw text: the truncated raw output as summary, used only when the task
//!    fallback has nothing to build from.
//!
//! Callers treat an upstream failure exactly like unparsable output and go
//! straight to [`fallback_narration`] / [`fallback_vision`].

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Language, NarrationResult, PanelDescriptor, VisionResult};

/// Confidence assumed when the model omits one
pub const DEFAULT_VISION_CONFIDENCE: f64 = 0.7;

/// Raw-text summary limit (characters). Vision output never reaches the
/// raw-text path because it always has a task-specific fallback.
pub const NARRATION_RAW_SUMMARY_CHARS: usize = 500;

/// A normalized result and whether it came from a fallback strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub result: T,
    pub used_fallback: bool,
}

impl<T> Normalized<T> {
    pub fn structured(result: T) -> Self {
        Self {
            result,
            used_fallback: false,
        }
    }

    pub fn fallback(result: T) -> Self {
        Self {
            result,
            used_fallback: true,
        }
    }
}

/// An object was found but a field could not be decoded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("confidence is not a number: {0}")]
    InvalidConfidence(String),
}

/// Find the first substring of `raw` that parses as a JSON object
///
/// Scans each `{` left to right and attempts a streaming parse from there,
/// so prose or code fences around the object are ignored.
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    for (start, _) in raw.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return Some(map);
        }
    }
    None
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
}

fn list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match keys.iter().find_map(|k| obj.get(*k)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn confidence_field(obj: &Map<String, Value>) -> Result<f64, DecodeError> {
    let value = match obj.get("confidence") {
        None | Some(Value::Null) => return Ok(DEFAULT_VISION_CONFIDENCE),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(c) if c.is_finite() => Ok(c.clamp(0.0, 1.0)),
        _ => Err(DecodeError::InvalidConfidence(
            obj.get("confidence").map(Value::to_string).unwrap_or_default(),
        )),
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim().to_string();
        if !item.is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// Read narration keys from an extracted object
pub fn narration_from_object(obj: &Map<String, Value>) -> NarrationResult {
    NarrationResult {
        summary: string_field(obj, &["summary"]).unwrap_or_default(),
        highlights: list_field(obj, &["highlights"]),
        risks: list_field(obj, &["risks"]),
        next_actions: list_field(obj, &["nextActions", "next_actions"]),
    }
}

/// Read vision keys from an extracted object
pub fn vision_from_object(obj: &Map<String, Value>) -> Result<VisionResult, DecodeError> {
    let summary = string_field(obj, &["summary"]).unwrap_or_default();
    let text = string_field(obj, &["text"]).unwrap_or_else(|| summary.clone());

    Ok(VisionResult {
        summary,
        text,
        highlights: list_field(obj, &["highlights"]),
        risks: list_field(obj, &["risks"]),
        next_actions: list_field(obj, &["nextActions", "next_actions"]),
        chart_types: dedup_preserving_order(list_field(obj, &["chartTypes", "chart_types"])),
        confidence: confidence_field(obj)?,
    })
}

/// First [`NARRATION_RAW_SUMMARY_CHARS`] characters of the raw text
pub fn raw_text_summary(raw: &str) -> String {
    raw.chars().take(NARRATION_RAW_SUMMARY_CHARS).collect()
}

/// Deterministic narration built from the submitted panels
pub fn fallback_narration(panels: &[PanelDescriptor], language: Language) -> NarrationResult {
    let names: Vec<&str> = panels.iter().map(|p| p.display_name()).collect();

    if language.is_zh() {
        NarrationResult {
            summary: format!(
                "本报告包含 {} 个数据面板的分析：{}。",
                panels.len(),
                names.join(", ")
            ),
            highlights: vec!["数据已成功加载".to_string()],
            risks: vec!["需要进一步分析以获取深入洞察".to_string()],
            next_actions: vec!["请查看各面板详细数据".to_string()],
        }
    } else {
        NarrationResult {
            summary: format!(
                "This report analyzes {} data panels: {}.",
                panels.len(),
                names.join(", ")
            ),
            highlights: vec!["Data loaded successfully".to_string()],
            risks: vec!["Further analysis needed for deeper insights".to_string()],
            next_actions: vec!["Please review detailed panel data".to_string()],
        }
    }
}

/// Deterministic recognition-failure result; confidence is always 0
pub fn fallback_vision(language: Language) -> VisionResult {
    if language.is_zh() {
        VisionResult {
            summary: "图像识别遇到问题，请稍后重试或尝试更清晰的截图".to_string(),
            text: "无法解析图像内容".to_string(),
            highlights: Vec::new(),
            risks: vec!["识别失败".to_string()],
            next_actions: vec!["请尝试重新截图".to_string()],
            chart_types: Vec::new(),
            confidence: 0.0,
        }
    } else {
        VisionResult {
            summary: "Image recognition encountered an issue. Please retry or try a clearer screenshot."
                .to_string(),
            text: "Unable to parse image content".to_string(),
            highlights: Vec::new(),
            risks: vec!["Recognition failed".to_string()],
            next_actions: vec!["Please try taking a new screenshot".to_string()],
            chart_types: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Normalize raw narration output
///
/// A structured result with a blank summary has it backfilled from the
/// panel template so the summary is never empty.
pub fn normalize_narration(
    raw: &str,
    panels: &[PanelDescriptor],
    language: Language,
) -> Normalized<NarrationResult> {
    if let Some(obj) = extract_json_object(raw) {
        let mut result = narration_from_object(&obj);
        if result.summary.trim().is_empty() {
            tracing::warn!("Model output has no summary, using panel template summary");
            result.summary = fallback_narration(panels, language).summary;
        }
        return Normalized::structured(result);
    }

    tracing::warn!(
        raw_chars = raw.chars().count(),
        "No JSON object in narration output, using fallback"
    );

    if panels.is_empty() && !raw.trim().is_empty() {
        return Normalized::fallback(NarrationResult {
            summary: raw_text_summary(raw),
            ..Default::default()
        });
    }

    Normalized::fallback(fallback_narration(panels, language))
}

/// Normalize raw vision output
pub fn normalize_vision(raw: &str, language: Language) -> Normalized<VisionResult> {
    match extract_json_object(raw).map(|obj| vision_from_object(&obj)) {
        Some(Ok(result)) => Normalized::structured(result),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Failed to decode vision response, using fallback");
            Normalized::fallback(fallback_vision(language))
        }
        None => {
            tracing::warn!(
                raw_chars = raw.chars().count(),
                "No JSON object in vision output, using fallback"
            );
            Normalized::fallback(fallback_vision(language))
        }
    }
}

//! Narration and vision result shapes

use serde::{Deserialize, Serialize};

/// Output language
///
/// Only Chinese has its own branch; every other tag uses English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Zh,
    En,
}

impl Language {
    pub fn from_tag(tag: &str) -> Self {
        if tag == "zh" {
            Language::Zh
        } else {
            Language::En
        }
    }

    pub fn is_zh(&self) -> bool {
        matches!(self, Language::Zh)
    }
}

/// Which pipeline produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Narration generated from panel data
    Narration,
    /// Interpretation of a dashboard screenshot
    Vision,
}

/// Structured interpretation of a set of panels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationResult {
    pub summary: String,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
    pub next_actions: Vec<String>,
}

/// Structured interpretation of a dashboard screenshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionResult {
    pub summary: String,
    /// Full interpretation text
    pub text: String,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
    pub next_actions: Vec<String>,
    /// Recognized chart kinds, deduplicated in first-seen order
    pub chart_types: Vec<String>,
    /// In [0, 1]
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::from_tag("zh"), Language::Zh);
        assert_eq!(Language::from_tag("en"), Language::En);
        assert_eq!(Language::from_tag("fr"), Language::En);
        assert_eq!(Language::from_tag(""), Language::En);
    }

    #[test]
    fn test_narration_result_wire_names() {
        let result = NarrationResult {
            summary: "s".to_string(),
            highlights: vec!["h".to_string()],
            risks: vec![],
            next_actions: vec!["a".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"summary": "s", "highlights": ["h"], "risks": [], "nextActions": ["a"]})
        );
    }

    #[test]
    fn test_task_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(TaskKind::Vision).unwrap(), json!("vision"));
    }
}

//! Narration from panel data
//!
//! prompt → inference → normalize. Never fails: an unrenderable prompt or an
//! upstream failure produces the panel-template fallback.

use std::sync::Arc;
use tracing::{info, warn};

use super::inference_gateway::{InferenceBackend, InferenceRequest, Modality};
use super::prompt_builder::build_narration_prompt;
use super::response_normalizer::{fallback_narration, normalize_narration, Normalized};
use crate::models::{Language, NarrationResult, PanelDescriptor};

#[derive(Clone)]
pub struct NarrationService {
    backend: Arc<dyn InferenceBackend>,
}

impl NarrationService {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate_narration(
        &self,
        panels: &[PanelDescriptor],
        language: Language,
    ) -> Normalized<NarrationResult> {
        let prompt = match build_narration_prompt(panels, language) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Failed to render narration prompt, using fallback");
                return Normalized::fallback(fallback_narration(panels, language));
            }
        };

        let request = InferenceRequest {
            prompt,
            modality: Modality::Text,
            language,
        };

        match self.backend.infer(&request).await {
            Ok(raw) => {
                let normalized = normalize_narration(&raw, panels, language);
                info!(
                    panel_count = panels.len(),
                    used_fallback = normalized.used_fallback,
                    "Narration generated"
                );
                normalized
            }
            Err(e) => {
                warn!(error = %e, panel_count = panels.len(), "Inference failed, using fallback narration");
                Normalized::fallback(fallback_narration(panels, language))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::inference_gateway::{InferenceError, InferenceGateway, InferenceSettings};
    use async_trait::async_trait;
    use serde_json::json;

    struct ScriptedBackend(Result<String, u16>);

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn infer(&self, _request: &InferenceRequest) -> Result<String, InferenceError> {
            self.0
                .clone()
                .map_err(|status| InferenceError::ApiError(status, "upstream".to_string()))
        }

        async fn synthesize(&self, _: &str, _: &str, _: f64) -> Result<Vec<u8>, InferenceError> {
            Ok(vec![0xFF])
        }

        fn is_demo(&self) -> bool {
            false
        }
    }

    fn panels() -> Vec<PanelDescriptor> {
        vec![serde_json::from_value(json!({
            "panelId": "revenue",
            "title": "Revenue",
            "metricType": "time_series",
            "unit": "USD",
            "timeRange": "2025-01",
            "data": [{"t": "2025-01", "v": 100000}]
        }))
        .unwrap()]
    }

    #[tokio::test]
    async fn test_upstream_failure_uses_template() {
        let service = NarrationService::new(Arc::new(ScriptedBackend(Err(503))));
        let out = service.generate_narration(&panels(), Language::En).await;

        assert!(out.used_fallback);
        assert_eq!(out.result.summary, "This report analyzes 1 data panels: Revenue.");
    }

    #[tokio::test]
    async fn test_model_output_is_normalized() {
        let raw = "```json\n{\"summary\": \"Revenue hit 100000\", \"highlights\": [\"up\"]}\n```";
        let service = NarrationService::new(Arc::new(ScriptedBackend(Ok(raw.to_string()))));
        let out = service.generate_narration(&panels(), Language::En).await;

        assert!(!out.used_fallback);
        assert_eq!(out.result.summary, "Revenue hit 100000");
        assert_eq!(out.result.highlights, vec!["up".to_string()]);
    }

    #[tokio::test]
    async fn test_demo_mode_produces_structured_result() {
        let gateway = InferenceGateway::new(InferenceSettings::default()).unwrap();
        let service = NarrationService::new(Arc::new(gateway));
        let out = service.generate_narration(&panels(), Language::Zh).await;

        assert!(!out.used_fallback);
        assert!(!out.result.summary.is_empty());
        assert_eq!(out.result.next_actions.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_panel_list_never_fails() {
        let service = NarrationService::new(Arc::new(ScriptedBackend(Ok(String::new()))));
        let out = service.generate_narration(&[], Language::En).await;

        assert!(out.used_fallback);
        assert!(!out.result.summary.is_empty());
    }
}

//! Inference backend client
//!
//! Text and vision reasoning go through an OpenAI-compatible
//! `/chat/completions` endpoint, speech through `/audio/speech`. Every call
//! carries its own timeout and is never retried.
//!
//! Without a configured credential the gateway runs in demo mode and answers
//! from [`demo_content`](super::demo_content) instead of calling out.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::demo_content;
use crate::models::Language;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";

/// Text reasoning timeout
pub const TEXT_TIMEOUT: Duration = Duration::from_secs(30);
/// Vision-with-image and speech timeout
pub const LONG_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("DashStory/", env!("CARGO_PKG_VERSION"));

/// Upstream failure talking to the inference backend
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// What the prompt is reasoned over
#[derive(Debug, Clone, PartialEq)]
pub enum Modality {
    Text,
    /// Prompt plus an image given as a data URI
    Vision { image_url: String },
}

/// One reasoning call
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    pub modality: Modality,
    /// Selects the canned demo content; not sent upstream
    pub language: Language,
}

/// Reasoning and speech backend
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run a reasoning call and return the raw model text
    async fn infer(&self, request: &InferenceRequest) -> Result<String, InferenceError>;

    /// Synthesize speech, returning MP3 bytes
    async fn synthesize(
        &self,
        text: &str,
        backend_voice: &str,
        speed: f64,
    ) -> Result<Vec<u8>, InferenceError>;

    /// True when answers are canned rather than model-derived
    fn is_demo(&self) -> bool;
}

/// Gateway settings
#[derive(Debug, Clone)]
pub struct InferenceSettings {
    /// Backend credential; `None` selects demo mode
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub tts_model: String,
    pub text_timeout: Duration,
    pub long_timeout: Duration,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            text_timeout: TEXT_TIMEOUT,
            long_timeout: LONG_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// HTTP implementation of [`InferenceBackend`]
pub struct InferenceGateway {
    http_client: reqwest::Client,
    settings: InferenceSettings,
}

impl InferenceGateway {
    pub fn new(settings: InferenceSettings) -> Result<Self, InferenceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| InferenceError::NetworkError(e.to_string()))?;

        if settings.api_key.is_none() {
            warn!("No inference API key configured, running in demo mode");
        }

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn chat_body(&self, request: &InferenceRequest) -> Value {
        match &request.modality {
            Modality::Text => json!({
                "model": self.settings.chat_model,
                "messages": [{"role": "user", "content": request.prompt}],
                "temperature": 0.7,
                "max_tokens": 1000
            }),
            Modality::Vision { image_url } => json!({
                "model": self.settings.vision_model,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": request.prompt},
                        {"type": "image_url", "image_url": {"url": image_url}}
                    ]
                }],
                "max_tokens": 1500
            }),
        }
    }

    async fn post_json(
        &self,
        api_key: &str,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<reqwest::Response, InferenceError> {
        let response = self
            .http_client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::ApiError(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Timeout(timeout)
    } else {
        InferenceError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl InferenceBackend for InferenceGateway {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            debug!("Demo mode: returning sample inference response");
            return Ok(match request.modality {
                Modality::Text => demo_content::narration_response(request.language),
                Modality::Vision { .. } => demo_content::vision_response(request.language),
            });
        };

        let timeout = match request.modality {
            Modality::Text => self.settings.text_timeout,
            Modality::Vision { .. } => self.settings.long_timeout,
        };

        debug!(
            prompt_chars = request.prompt.chars().count(),
            vision = matches!(request.modality, Modality::Vision { .. }),
            "Sending inference request"
        );

        let response = self
            .post_json(api_key, &self.endpoint("chat/completions"), &self.chat_body(request), timeout)
            .await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::ParseError(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InferenceError::ParseError("Response has no message content".to_string()))?;

        info!(content_chars = content.chars().count(), "Inference completed");
        Ok(content)
    }

    async fn synthesize(
        &self,
        text: &str,
        backend_voice: &str,
        speed: f64,
    ) -> Result<Vec<u8>, InferenceError> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            warn!("No inference API key, returning demo audio");
            return Ok(demo_content::DEMO_MP3_FRAME.to_vec());
        };

        let body = json!({
            "model": self.settings.tts_model,
            "input": text,
            "voice": backend_voice,
            "response_format": "mp3",
            "speed": speed
        });

        let timeout = self.settings.long_timeout;
        let response = self
            .post_json(api_key, &self.endpoint("audio/speech"), &body, timeout)
            .await?;

        let bytes = response.bytes().await.map_err(|e| transport_error(e, timeout))?;
        Ok(bytes.to_vec())
    }

    fn is_demo(&self) -> bool {
        self.settings.api_key.is_none()
    }
}

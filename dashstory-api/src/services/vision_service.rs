//! Dashboard screenshot interpretation
//!
//! The image payload is decoded and size-checked before anything leaves the
//! process; an oversized image never reaches the inference backend.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::inference_gateway::{InferenceBackend, InferenceRequest, Modality};
use super::prompt_builder::build_vision_prompt;
use super::response_normalizer::{fallback_vision, normalize_vision, Normalized};
use crate::models::{Language, VisionResult};

/// Largest accepted decoded image (2 MiB)
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    #[error("Image is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Image size {size} bytes exceeds {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// A decoded, size-checked image ready for inference
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Data URI sent to the backend
    pub data_uri: String,
    pub decoded_len: usize,
}

/// Decode a base64 or data-URI image and enforce [`MAX_IMAGE_BYTES`]
///
/// A bare base64 string is wrapped as a PNG data URI; a data URI is passed
/// through unchanged.
pub fn decode_image_payload(image: &str) -> Result<ImagePayload, ImageError> {
    let image = image.trim();
    let encoded = match image.split_once(',') {
        Some((_, data)) => data,
        None => image,
    };

    // Line-wrapped (MIME style) payloads are accepted
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let decoded_len = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| ImageError::InvalidEncoding(e.to_string()))?
        .len();

    if decoded_len > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            size: decoded_len,
            limit: MAX_IMAGE_BYTES,
        });
    }

    let data_uri = if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/png;base64,{}", image)
    };

    Ok(ImagePayload {
        data_uri,
        decoded_len,
    })
}

#[derive(Clone)]
pub struct VisionService {
    backend: Arc<dyn InferenceBackend>,
}

impl VisionService {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Interpret an already-validated image; never fails
    pub async fn interpret(&self, image: &ImagePayload, language: Language) -> Normalized<VisionResult> {
        let request = InferenceRequest {
            prompt: build_vision_prompt(language),
            modality: Modality::Vision {
                image_url: image.data_uri.clone(),
            },
            language,
        };

        match self.backend.infer(&request).await {
            Ok(raw) => {
                let normalized = normalize_vision(&raw, language);
                info!(
                    image_bytes = image.decoded_len,
                    confidence = normalized.result.confidence,
                    chart_types = ?normalized.result.chart_types,
                    used_fallback = normalized.used_fallback,
                    "Vision interpretation completed"
                );
                normalized
            }
            Err(e) => {
                warn!(error = %e, "Vision inference failed, using fallback");
                Normalized::fallback(fallback_vision(language))
            }
        }
    }
}

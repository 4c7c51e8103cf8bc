//! Speech synthesis dispatch
//!
//! Turns narration text into a stored MP3 and an estimated duration. Never
//! fails: any backend or storage problem yields a placeholder locator with
//! duration 0 and the error attached.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::audio_store::{placeholder_locator, AudioStore};
use super::inference_gateway::InferenceBackend;
use super::voice_catalog;

/// Longest input the speech backend accepts (characters)
pub const MAX_SYNTHESIS_CHARS: usize = 4096;

pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 4.0;

/// Characters per minute used for the duration estimate
const CHARS_PER_MINUTE: f64 = 150.0;

/// Result of one synthesis attempt
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutcome {
    pub audio_url: String,
    /// Estimated seconds, two decimals; 0 on failure
    pub duration_seconds: f64,
    pub format: &'static str,
    /// Set when the placeholder locator was returned
    pub error: Option<String>,
}

impl SynthesisOutcome {
    pub fn is_placeholder(&self) -> bool {
        self.error.is_some()
    }
}

/// Clamp speed into the backend range; non-finite input becomes 1.0
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        1.0
    }
}

/// `chars / 150 * 60 / speed`, rounded to two decimals
pub fn estimate_duration(char_count: usize, speed: f64) -> f64 {
    let seconds = char_count as f64 / CHARS_PER_MINUTE * 60.0 / speed;
    (seconds * 100.0).round() / 100.0
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct SynthesisDispatcher {
    backend: Arc<dyn InferenceBackend>,
    store: Arc<dyn AudioStore>,
}

impl SynthesisDispatcher {
    pub fn new(backend: Arc<dyn InferenceBackend>, store: Arc<dyn AudioStore>) -> Self {
        Self { backend, store }
    }

    /// Synthesize `text` with catalog voice `voice_id` at `speed`
    pub async fn synthesize(&self, text: &str, voice_id: &str, speed: f64) -> SynthesisOutcome {
        let speed = clamp_speed(speed);
        let backend_voice = voice_catalog::backend_voice_for(voice_id);

        let input_chars = text.chars().count();
        let input = if input_chars > MAX_SYNTHESIS_CHARS {
            warn!(
                input_chars,
                limit = MAX_SYNTHESIS_CHARS,
                "Synthesis text exceeds backend limit, truncating"
            );
            truncate_chars(text, MAX_SYNTHESIS_CHARS)
        } else {
            text
        };
        let spoken_chars = input_chars.min(MAX_SYNTHESIS_CHARS);

        let bytes = match self.backend.synthesize(input, backend_voice, speed).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, voice = backend_voice, "Speech synthesis failed");
                return Self::placeholder(e.to_string());
            }
        };

        match self.store.put(Uuid::new_v4(), bytes).await {
            Ok(audio_url) => {
                let duration_seconds = estimate_duration(spoken_chars, speed);
                info!(
                    audio_url = %audio_url,
                    duration_seconds,
                    voice = backend_voice,
                    "Speech synthesized"
                );
                SynthesisOutcome {
                    audio_url,
                    duration_seconds,
                    format: "mp3",
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to store synthesized audio");
                Self::placeholder(e.to_string())
            }
        }
    }

    fn placeholder(error: String) -> SynthesisOutcome {
        SynthesisOutcome {
            audio_url: placeholder_locator(),
            duration_seconds: 0.0,
            format: "mp3",
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audio_store::{AudioStoreError, LocalAudioStore};
    use crate::services::inference_gateway::{InferenceError, InferenceRequest};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last synthesis call; optionally fails
    #[derive(Default)]
    struct RecordingBackend {
        fail: bool,
        calls: Mutex<Vec<(usize, String, f64)>>,
    }

    #[async_trait]
    impl InferenceBackend for RecordingBackend {
        async fn infer(&self, _request: &InferenceRequest) -> Result<String, InferenceError> {
            Ok(String::new())
        }

        async fn synthesize(
            &self,
            text: &str,
            backend_voice: &str,
            speed: f64,
        ) -> Result<Vec<u8>, InferenceError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.chars().count(), backend_voice.to_string(), speed));
            if self.fail {
                Err(InferenceError::ApiError(500, "boom".to_string()))
            } else {
                Ok(vec![0xFF, 0xFB])
            }
        }

        fn is_demo(&self) -> bool {
            false
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl AudioStore for BrokenStore {
        async fn put(&self, _id: Uuid, _bytes: Vec<u8>) -> Result<String, AudioStoreError> {
            Err(AudioStoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn dispatcher(
        backend: Arc<RecordingBackend>,
        dir: &tempfile::TempDir,
    ) -> SynthesisDispatcher {
        SynthesisDispatcher::new(
            backend,
            Arc::new(LocalAudioStore::new(dir.path(), "/api/v1/audio")),
        )
    }

    #[test]
    fn test_duration_estimate() {
        assert_eq!(estimate_duration(150, 1.0), 60.0);
        assert_eq!(estimate_duration(100, 1.0), 40.0);
        assert_eq!(estimate_duration(100, 2.0), 20.0);
        assert_eq!(estimate_duration(7, 1.0), 2.8);
        assert_eq!(estimate_duration(1, 3.0), 0.13);
    }

    #[test]
    fn test_clamp_speed() {
        assert_eq!(clamp_speed(0.1), MIN_SPEED);
        assert_eq!(clamp_speed(9.0), MAX_SPEED);
        assert_eq!(clamp_speed(1.5), 1.5);
        assert_eq!(clamp_speed(f64::NAN), 1.0);
        assert_eq!(clamp_speed(f64::INFINITY), 1.0);
    }

    #[tokio::test]
    async fn test_successful_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let outcome = dispatcher(backend.clone(), &dir)
            .synthesize("Revenue is up", "friendly", 1.0)
            .await;

        assert!(outcome.audio_url.starts_with("/api/v1/audio/"));
        assert!(outcome.error.is_none());
        assert_eq!(outcome.format, "mp3");
        assert_eq!(outcome.duration_seconds, estimate_duration(13, 1.0));

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].1, "nova");
    }

    #[tokio::test]
    async fn test_long_text_is_truncated_before_backend() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let text = "字".repeat(5000);
        let outcome = dispatcher(backend.clone(), &dir)
            .synthesize(&text, "calm", 1.0)
            .await;

        assert_eq!(backend.calls.lock().unwrap()[0].0, MAX_SYNTHESIS_CHARS);
        assert_eq!(outcome.duration_seconds, estimate_duration(MAX_SYNTHESIS_CHARS, 1.0));
    }

    #[tokio::test]
    async fn test_unknown_voice_and_out_of_range_speed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        dispatcher(backend.clone(), &dir)
            .synthesize("hi", "robot", 10.0)
            .await;

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].1, "onyx");
        assert_eq!(calls[0].2, MAX_SPEED);
    }

    #[tokio::test]
    async fn test_backend_failure_yields_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend {
            fail: true,
            ..Default::default()
        });
        let outcome = dispatcher(backend, &dir).synthesize("hi", "calm", 1.0).await;

        assert!(outcome.is_placeholder());
        assert!(outcome.audio_url.starts_with("/audio/placeholder/"));
        assert_eq!(outcome.duration_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_store_failure_yields_placeholder() {
        let dispatcher = SynthesisDispatcher::new(
            Arc::new(RecordingBackend::default()),
            Arc::new(BrokenStore),
        );
        let outcome = dispatcher.synthesize("hi", "calm", 1.0).await;

        assert!(outcome.is_placeholder());
        assert!(outcome.error.unwrap().contains("read-only"));
    }
}

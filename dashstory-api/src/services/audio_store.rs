//! Storage for synthesized audio
//!
//! The store turns MP3 bytes into a retrievable locator. The local
//! implementation writes `<storage_dir>/<id>.mp3` and hands back a URL path
//! under which the HTTP layer serves that directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Default public path the audio directory is served under
pub const DEFAULT_PUBLIC_PATH: &str = "/api/v1/audio";

#[derive(Debug, Error)]
pub enum AudioStoreError {
    #[error("Audio storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty audio payload")]
    EmptyPayload,
}

/// Destination for synthesized audio
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Persist MP3 bytes for `audio_id`, returning the public locator
    async fn put(&self, audio_id: Uuid, bytes: Vec<u8>) -> Result<String, AudioStoreError>;
}

/// Locator returned when synthesis fails; well-formed but not retrievable
pub fn placeholder_locator() -> String {
    format!("/audio/placeholder/{}.mp3", Uuid::new_v4())
}

/// Filesystem-backed audio store
#[derive(Debug, Clone)]
pub struct LocalAudioStore {
    storage_dir: PathBuf,
    public_path: String,
}

impl LocalAudioStore {
    pub fn new(storage_dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        let public_path: String = public_path.into();
        Self {
            storage_dir: storage_dir.into(),
            public_path: public_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Create the storage directory if missing
    pub async fn ensure_dir(&self) -> Result<(), AudioStoreError> {
        tokio::fs::create_dir_all(&self.storage_dir).await?;
        Ok(())
    }
}

#[async_trait]
impl AudioStore for LocalAudioStore {
    async fn put(&self, audio_id: Uuid, bytes: Vec<u8>) -> Result<String, AudioStoreError> {
        if bytes.is_empty() {
            return Err(AudioStoreError::EmptyPayload);
        }

        let file_name = format!("{}.mp3", audio_id);
        self.ensure_dir().await?;
        let path = self.storage_dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        debug!(path = %path.display(), bytes = bytes.len(), "Stored audio");
        Ok(format!("{}/{}", self.public_path, file_name))
    }
}

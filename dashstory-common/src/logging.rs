//! Tracing subscriber initialization
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Build the env filter for the given default level
pub fn build_filter(default_level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", default_level, e)))
}

/// Install the global fmt subscriber
pub fn init_tracing(default_level: &str) -> Result<()> {
    let filter = build_filter(default_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {}", e)))
}

//! Bootstrap configuration loading
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments (applied by the service binary)
//! 2. Environment variables (`DASHSTORY_*`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! This module owns tiers 2-4 for the config file location and the TOML
//! schema itself. Service-specific resolution (which env var overrides which
//! key) lives with the service.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DASHSTORY_CONFIG";

/// Default HTTP port for dashstory-api
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration loaded from TOML
///
/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Bind address
    pub host: Option<String>,
    /// HTTP server port
    pub port: Option<u16>,
    /// Allowed CORS origins (`"*"` allows any)
    pub cors_origins: Option<Vec<String>>,
    pub logging: LoggingConfig,
    pub inference: InferenceConfig,
    pub tts: TtsConfig,
    pub audio: AudioConfig,
    pub auth: AuthConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Inference backend section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Backend credential; absent means demo mode
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub vision_model: Option<String>,
    pub tts_model: Option<String>,
}

/// Speech synthesis section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TtsConfig {
    pub default_voice: Option<String>,
    pub speed: Option<f64>,
}

/// Local audio store section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory synthesized audio is written to
    pub storage_dir: Option<PathBuf>,
    /// URL path prefix under which stored audio is served
    pub public_path: Option<String>,
}

/// Bearer token section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: Option<i64>,
    pub api_key_ttl_days: Option<i64>,
}

/// Default per-user config file location (`<config_dir>/dashstory/dashstory.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dashstory").join("dashstory.toml"))
}

/// Default directory for locally stored audio
///
/// `<data_local_dir>/dashstory/audio`, or under the system temp dir when the
/// platform has no data directory.
pub fn default_audio_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dashstory")
        .join("audio")
}

/// Resolve which config file to read, if any
///
/// Priority: CLI argument → `DASHSTORY_CONFIG` → default location (only if it exists).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_value(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    default_config_path().filter(|p| p.exists())
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

/// Load the config file chosen by [`resolve_config_path`], or defaults when none
///
/// An explicitly named file that cannot be read is an error; a missing
/// default-location file is not.
pub fn load_bootstrap_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => load_toml_config(&path),
        None => {
            debug!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Read an environment variable, treating empty/whitespace values as unset
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

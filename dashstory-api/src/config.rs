//! Configuration resolution for dashstory-api
//!
//! Resolves a single [`ServiceConfig`] at startup with CLI → ENV → TOML →
//! default priority. The result is passed to components explicitly; nothing
//! reads configuration lazily afterwards.

use dashstory_common::config::{default_audio_dir, env_value, TomlConfig, DEFAULT_PORT};
use dashstory_common::{Error, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::services::audio_store::DEFAULT_PUBLIC_PATH;
use crate::services::inference_gateway::{
    InferenceSettings, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_TTS_MODEL,
    DEFAULT_VISION_MODEL, LONG_TIMEOUT, TEXT_TIMEOUT,
};
use crate::services::voice_catalog::{self, DEFAULT_VOICE_ID};

pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Access token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24;
pub const DEFAULT_API_KEY_TTL_DAYS: i64 = 365;

pub const ENV_HOST: &str = "DASHSTORY_HOST";
pub const ENV_PORT: &str = "DASHSTORY_PORT";
pub const ENV_LOG_LEVEL: &str = "DASHSTORY_LOG_LEVEL";
pub const ENV_API_KEY: &str = "DASHSTORY_OPENAI_API_KEY";
/// Conventional variable accepted as an alias of [`ENV_API_KEY`]
pub const ENV_API_KEY_ALIAS: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "DASHSTORY_INFERENCE_BASE_URL";
pub const ENV_AUDIO_DIR: &str = "DASHSTORY_AUDIO_DIR";
pub const ENV_DEFAULT_VOICE: &str = "DASHSTORY_DEFAULT_VOICE";
pub const ENV_JWT_SECRET: &str = "DASHSTORY_JWT_SECRET";

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub audio_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub inference: InferenceSettings,
    pub default_voice: String,
    pub speed: f64,
    pub audio_dir: PathBuf,
    pub audio_public_path: String,
    /// `None` means an ephemeral secret is generated at startup
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: i64,
    pub api_key_ttl_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            inference: InferenceSettings::default(),
            default_voice: DEFAULT_VOICE_ID.to_string(),
            speed: 1.0,
            audio_dir: default_audio_dir(),
            audio_public_path: DEFAULT_PUBLIC_PATH.to_string(),
            jwt_secret: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            api_key_ttl_days: DEFAULT_API_KEY_TTL_DAYS,
        }
    }
}

impl ServiceConfig {
    /// Merge CLI overrides, environment and TOML into one config
    pub fn resolve(toml: &TomlConfig, cli: &ConfigOverrides) -> Result<Self> {
        let port = match (cli.port, env_value(ENV_PORT)) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", ENV_PORT, raw, e)))?,
            (None, None) => toml.port.unwrap_or(DEFAULT_PORT),
        };

        let default_voice = env_value(ENV_DEFAULT_VOICE)
            .or_else(|| toml.tts.default_voice.clone())
            .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string());
        if voice_catalog::find(&default_voice).is_none() {
            warn!(
                "Default voice '{}' is not in the catalog; requests will use '{}'",
                default_voice, DEFAULT_VOICE_ID
            );
        }

        let speed = toml.tts.speed.unwrap_or(1.0);
        if !(speed.is_finite() && speed > 0.0) {
            return Err(Error::Config(format!("Invalid tts.speed: {}", speed)));
        }

        let audio_public_path = toml
            .audio
            .public_path
            .clone()
            .unwrap_or_else(|| DEFAULT_PUBLIC_PATH.to_string());
        let trimmed = audio_public_path.trim_end_matches('/');
        if !trimmed.starts_with('/') || trimmed.is_empty() {
            return Err(Error::Config(format!(
                "audio.public_path must be an absolute URL path other than '/': '{}'",
                audio_public_path
            )));
        }
        let audio_public_path = trimmed.to_string();

        let inference = InferenceSettings {
            api_key: resolve_api_key(cli.api_key.as_deref(), toml),
            base_url: env_value(ENV_BASE_URL)
                .or_else(|| toml.inference.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            chat_model: toml
                .inference
                .chat_model
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            vision_model: toml
                .inference
                .vision_model
                .clone()
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            tts_model: toml
                .inference
                .tts_model
                .clone()
                .unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            text_timeout: TEXT_TIMEOUT,
            long_timeout: LONG_TIMEOUT,
        };

        Ok(Self {
            host: cli
                .host
                .clone()
                .or_else(|| env_value(ENV_HOST))
                .or_else(|| toml.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            cors_origins: toml
                .cors_origins
                .clone()
                .filter(|origins| !origins.is_empty())
                .unwrap_or_else(|| vec!["*".to_string()]),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| env_value(ENV_LOG_LEVEL))
                .unwrap_or_else(|| toml.logging.level.clone()),
            inference,
            default_voice,
            speed,
            audio_dir: cli
                .audio_dir
                .clone()
                .or_else(|| env_value(ENV_AUDIO_DIR).map(PathBuf::from))
                .or_else(|| toml.audio.storage_dir.clone())
                .unwrap_or_else(default_audio_dir),
            audio_public_path,
            jwt_secret: env_value(ENV_JWT_SECRET).or_else(|| toml.auth.jwt_secret.clone()),
            token_ttl_minutes: toml
                .auth
                .token_ttl_minutes
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
            api_key_ttl_days: toml.auth.api_key_ttl_days.unwrap_or(DEFAULT_API_KEY_TTL_DAYS),
        })
    }

    /// True when the inference gateway will answer with canned content
    pub fn demo_mode(&self) -> bool {
        self.inference.api_key.is_none()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve the inference credential
///
/// **Priority:** CLI → `DASHSTORY_OPENAI_API_KEY` → `OPENAI_API_KEY` → TOML.
/// Returns `None` (demo mode) when no tier has a non-blank value.
pub fn resolve_api_key(cli: Option<&str>, toml: &TomlConfig) -> Option<String> {
    let tiers: [(&str, Option<String>); 4] = [
        ("command line", cli.map(str::trim).filter(|k| !k.is_empty()).map(String::from)),
        ("environment", env_value(ENV_API_KEY)),
        ("environment (OPENAI_API_KEY)", env_value(ENV_API_KEY_ALIAS)),
        (
            "TOML config",
            toml.inference
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
        ),
    ];

    let sources: Vec<&str> = tiers
        .iter()
        .filter(|(_, value)| value.is_some())
        .map(|(name, _)| *name)
        .collect();

    if sources.len() > 1 {
        warn!(
            "Inference API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    let resolved = tiers
        .into_iter()
        .find_map(|(name, value)| value.map(|key| (name, key)));

    match resolved {
        Some((source, key)) => {
            info!("Inference API key loaded from {}", source);
            Some(key)
        }
        None => {
            info!("No inference API key configured");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            ENV_HOST,
            ENV_PORT,
            ENV_LOG_LEVEL,
            ENV_API_KEY,
            ENV_API_KEY_ALIAS,
            ENV_BASE_URL,
            ENV_AUDIO_DIR,
            ENV_DEFAULT_VOICE,
            ENV_JWT_SECRET,
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        clear_env();
        let config = ServiceConfig::resolve(&TomlConfig::default(), &ConfigOverrides::default()).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.default_voice, "professional");
        assert_eq!(config.audio_public_path, "/api/v1/audio");
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.api_key_ttl_days, 365);
        assert!(config.demo_mode());
    }

    #[test]
    #[serial]
    fn test_priority_cli_env_toml() {
        clear_env();
        let toml: TomlConfig = toml::from_str("port = 6000\nhost = \"10.0.0.1\"").unwrap();

        let config = ServiceConfig::resolve(&toml, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.port, 6000);

        std::env::set_var(ENV_PORT, "6100");
        let config = ServiceConfig::resolve(&toml, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.port, 6100);

        let cli = ConfigOverrides {
            port: Some(6200),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(&toml, &cli).unwrap();
        assert_eq!(config.port, 6200);
        assert_eq!(config.host, "10.0.0.1");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_port_is_error() {
        clear_env();
        std::env::set_var(ENV_PORT, "eighty");
        let result = ServiceConfig::resolve(&TomlConfig::default(), &ConfigOverrides::default());
        clear_env();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_api_key_alias_and_priority() {
        clear_env();
        let toml: TomlConfig = toml::from_str("[inference]\napi_key = \"from-toml\"").unwrap();
        assert_eq!(resolve_api_key(None, &toml).as_deref(), Some("from-toml"));

        std::env::set_var(ENV_API_KEY_ALIAS, "from-alias");
        assert_eq!(resolve_api_key(None, &toml).as_deref(), Some("from-alias"));

        std::env::set_var(ENV_API_KEY, "from-env");
        assert_eq!(resolve_api_key(None, &toml).as_deref(), Some("from-env"));

        assert_eq!(resolve_api_key(Some("from-cli"), &toml).as_deref(), Some("from-cli"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_api_key_means_demo_mode() {
        clear_env();
        let toml: TomlConfig = toml::from_str("[inference]\napi_key = \"  \"").unwrap();
        assert_eq!(resolve_api_key(Some(""), &toml), None);
    }

    #[test]
    #[serial]
    fn test_public_path_validation() {
        clear_env();
        let toml: TomlConfig = toml::from_str("[audio]\npublic_path = \"/media/\"").unwrap();
        let config = ServiceConfig::resolve(&toml, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.audio_public_path, "/media");

        for bad in ["/", "media"] {
            let toml: TomlConfig = toml::from_str(&format!("[audio]\npublic_path = \"{}\"", bad)).unwrap();
            assert!(ServiceConfig::resolve(&toml, &ConfigOverrides::default()).is_err());
        }
    }

    #[test]
    #[serial]
    fn test_non_positive_speed_rejected() {
        clear_env();
        let toml: TomlConfig = toml::from_str("[tts]\nspeed = 0.0").unwrap();
        assert!(ServiceConfig::resolve(&toml, &ConfigOverrides::default()).is_err());
    }
}

//! dashstory-api library interface
//!
//! Exposes the router and state for the binary and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::FromRef;
use axum::http::HeaderValue;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::TokenAuthority;
use crate::config::ServiceConfig;
use crate::services::{
    AudioStore, InferenceBackend, InferenceError, InferenceGateway, JobTracker, LocalAudioStore,
    Pipeline,
};

/// Prefix for all versioned API routes
pub const API_PREFIX: &str = "/api/v1";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub pipeline: Pipeline,
    pub tokens: Arc<TokenAuthority>,
    /// True when inference answers come from canned demo content
    pub demo_mode: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        backend: Arc<dyn InferenceBackend>,
        store: Arc<dyn AudioStore>,
        tokens: TokenAuthority,
    ) -> Self {
        let demo_mode = backend.is_demo();
        let pipeline = Pipeline::new(backend, store, JobTracker::new(), config.speed);
        Self {
            config: Arc::new(config),
            pipeline,
            tokens: Arc::new(tokens),
            demo_mode,
            startup_time: Utc::now(),
        }
    }

    /// Wire the HTTP gateway, local audio store and token authority from config
    pub fn from_config(config: ServiceConfig) -> Result<Self, InferenceError> {
        let backend = InferenceGateway::new(config.inference.clone())?;
        let store = LocalAudioStore::new(&config.audio_dir, config.audio_public_path.clone());
        let tokens = match config.jwt_secret.as_deref() {
            Some(secret) => {
                TokenAuthority::new(secret, config.token_ttl_minutes, config.api_key_ttl_days)
            }
            None => TokenAuthority::ephemeral(config.token_ttl_minutes, config.api_key_ttl_days),
        };
        Ok(Self::new(config, Arc::new(backend), Arc::new(store), tokens))
    }
}

impl FromRef<AppState> for Arc<TokenAuthority> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(values))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(api::narration_routes())
        .merge(api::vision_routes())
        .merge(api::voice_routes())
        .merge(api::panel_routes())
        .merge(api::telemetry_routes())
        .merge(api::auth_routes());

    let audio = ServeDir::new(&state.config.audio_dir);

    Router::new()
        .merge(api::health_routes())
        .nest(API_PREFIX, api)
        .nest_service(&state.config.audio_public_path, audio)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

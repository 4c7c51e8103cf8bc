//! Shared fixtures for dashstory-api integration tests
//!
//! Builds the router over a temp audio directory with either the demo
//! gateway (no credential) or a scripted in-process backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;

use dashstory_api::auth::{TokenAuthority, ROLE_ADMIN, ROLE_USER};
use dashstory_api::config::ServiceConfig;
use dashstory_api::services::{
    InferenceBackend, InferenceError, InferenceGateway, InferenceRequest, LocalAudioStore,
    Modality,
};
use dashstory_api::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router plus the pieces tests inspect afterwards
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Held so the audio directory outlives the test
    pub audio_dir: TempDir,
}

impl TestApp {
    /// App backed by the demo gateway (no inference credential)
    pub fn demo() -> Self {
        let audio_dir = tempfile::tempdir().unwrap();
        let config = test_config(&audio_dir);
        let gateway = InferenceGateway::new(config.inference.clone()).unwrap();
        Self::build(config, Arc::new(gateway), audio_dir)
    }

    /// App backed by an in-process backend
    pub fn with_backend(backend: Arc<dyn InferenceBackend>) -> Self {
        let audio_dir = tempfile::tempdir().unwrap();
        let config = test_config(&audio_dir);
        Self::build(config, backend, audio_dir)
    }

    fn build(config: ServiceConfig, backend: Arc<dyn InferenceBackend>, audio_dir: TempDir) -> Self {
        let store = LocalAudioStore::new(audio_dir.path(), config.audio_public_path.clone());
        let tokens = TokenAuthority::new(TEST_SECRET, 60, 365);
        let state = AppState::new(config, backend, Arc::new(store), tokens);
        let router = dashstory_api::build_router(state.clone());
        Self {
            router,
            state,
            audio_dir,
        }
    }
}

pub fn test_config(audio_dir: &TempDir) -> ServiceConfig {
    ServiceConfig {
        audio_dir: audio_dir.path().to_path_buf(),
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..ServiceConfig::default()
    }
}

/// Bearer token for an ordinary user in org-1
pub fn user_token() -> String {
    TokenAuthority::new(TEST_SECRET, 60, 365)
        .issue_access_token("user-1", "org-1", ROLE_USER, vec!["read".to_string()])
        .unwrap()
}

/// Bearer token for an admin in org-1
pub fn admin_token() -> String {
    TokenAuthority::new(TEST_SECRET, 60, 365)
        .issue_access_token("admin-1", "org-1", ROLE_ADMIN, vec!["read".to_string(), "write".to_string()])
        .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn extract_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn extract_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Backend returning fixed text per modality and counting calls
pub struct ScriptedBackend {
    pub narration_text: String,
    pub vision_text: String,
    pub infer_calls: AtomicUsize,
    pub synth_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(narration_text: &str, vision_text: &str) -> Arc<Self> {
        Arc::new(Self {
            narration_text: narration_text.to_string(),
            vision_text: vision_text.to_string(),
            infer_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
        })
    }

    pub fn infer_count(&self) -> usize {
        self.infer_calls.load(Ordering::SeqCst)
    }

    pub fn synth_count(&self) -> usize {
        self.synth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        self.infer_calls.fetch_add(1, Ordering::SeqCst);
        Ok(match request.modality {
            Modality::Text => self.narration_text.clone(),
            Modality::Vision { .. } => self.vision_text.clone(),
        })
    }

    async fn synthesize(
        &self,
        _text: &str,
        _backend_voice: &str,
        _speed: f64,
    ) -> Result<Vec<u8>, InferenceError> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0xFF, 0xFB, 0x90, 0x00])
    }

    fn is_demo(&self) -> bool {
        false
    }
}

/// Backend whose every call fails like an unreachable upstream
pub struct UnreachableBackend;

#[async_trait::async_trait]
impl InferenceBackend for UnreachableBackend {
    async fn infer(&self, _request: &InferenceRequest) -> Result<String, InferenceError> {
        Err(InferenceError::NetworkError("connection refused".to_string()))
    }

    async fn synthesize(
        &self,
        _text: &str,
        _backend_voice: &str,
        _speed: f64,
    ) -> Result<Vec<u8>, InferenceError> {
        Err(InferenceError::ApiError(503, "unavailable".to_string()))
    }

    fn is_demo(&self) -> bool {
        false
    }
}

/// One well-formed time series panel
pub fn revenue_panel() -> Value {
    serde_json::json!({
        "panelId": "revenue",
        "title": "Monthly Revenue",
        "metricType": "time_series",
        "unit": "USD",
        "timeRange": "last_30d",
        "data": [{"t": "2025-01", "v": 100000}]
    })
}

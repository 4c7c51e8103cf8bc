//! Client telemetry intake
//!
//! Events are logged, not stored.

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::AuthenticatedUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TelemetryEvent {
    pub event: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Client timestamp (epoch milliseconds)
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TelemetryBatchRequest {
    pub events: Vec<TelemetryEvent>,
}

#[derive(Debug, Serialize)]
pub struct TelemetryBatchResponse {
    pub recorded: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRequest {
    pub panel_id: String,
    pub duration: f64,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    pub success: bool,
}

/// POST /telemetry
pub async fn record_telemetry(
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<TelemetryBatchRequest>,
) -> Json<TelemetryBatchResponse> {
    for event in &request.events {
        let properties = serde_json::Value::Object(event.properties.clone());
        tracing::info!(
            org_id = ?user.org_id,
            event = %event.event,
            properties = %properties,
            timestamp = ?event.timestamp,
            "Telemetry event"
        );
    }

    Json(TelemetryBatchResponse {
        recorded: request.events.len(),
    })
}

/// POST /telemetry/playback
pub async fn record_playback(
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<PlaybackRequest>,
) -> Json<PlaybackResponse> {
    tracing::info!(
        org_id = ?user.org_id,
        panel_id = %request.panel_id,
        duration = request.duration,
        completed = request.completed,
        "Playback telemetry"
    );
    Json(PlaybackResponse { success: true })
}

pub fn telemetry_routes() -> Router<AppState> {
    Router::new()
        .route("/telemetry", post(record_telemetry))
        .route("/telemetry/playback", post(record_playback))
}

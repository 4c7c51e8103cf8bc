//! Vision API handlers
//!
//! POST /vision/interpret, GET /vision/status/:job_id

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::narration::{load_job, JobStatusResponse};
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{Language, TaskKind};
use crate::services::decode_image_payload;
use crate::services::vision_service::MAX_IMAGE_BYTES;
use crate::AppState;

/// Request body limit; leaves room for base64 expansion so oversized images
/// reach the decoded-size check and get a 413 with a JSON body
const MAX_REQUEST_BYTES: usize = 4 * MAX_IMAGE_BYTES;

fn default_language() -> String {
    "zh".to_string()
}

/// POST /vision/interpret request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionInterpretRequest {
    /// Base64 image or data URI
    pub image: String,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// POST /vision/interpret response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionInterpretResponse {
    pub job_id: Uuid,
    pub text: String,
    /// Null when confidence is below the synthesis threshold
    pub audio_url: Option<String>,
    pub summary: String,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
    pub next_actions: Vec<String>,
    pub confidence: f64,
    pub chart_types: Vec<String>,
}

/// POST /vision/interpret
pub async fn interpret_image(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<VisionInterpretRequest>,
) -> ApiResult<Json<VisionInterpretResponse>> {
    tracing::info!(
        org_id = ?user.org_id,
        page_url = ?request.page_url,
        "Vision interpret request received"
    );

    // Size check happens before any inference call
    let image = decode_image_payload(&request.image)?;

    let voice_id = request
        .voice_id
        .unwrap_or_else(|| state.config.default_voice.clone());

    let outcome = state
        .pipeline
        .interpret_image(&image, Language::from_tag(&request.language), &voice_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Vision interpretation failed");
            ApiError::VisionFailed(e.to_string())
        })?;

    let result = outcome.result;
    Ok(Json(VisionInterpretResponse {
        job_id: outcome.job.job_id,
        text: result.text,
        audio_url: outcome.audio.map(|a| a.audio_url),
        summary: result.summary,
        highlights: result.highlights,
        risks: result.risks,
        next_actions: result.next_actions,
        confidence: result.confidence,
        chart_types: result.chart_types,
    }))
}

/// GET /vision/status/:job_id
pub async fn get_vision_status(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = load_job(&state, &job_id, TaskKind::Vision).await?;
    Ok(Json(job.into()))
}

/// Build vision routes
pub fn vision_routes() -> Router<AppState> {
    Router::new()
        .route("/vision/interpret", post(interpret_image))
        .route("/vision/status/:job_id", get(get_vision_status))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

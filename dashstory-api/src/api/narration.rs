//! Narration API handlers
//!
//! POST /narration/play, POST /narration/submit, GET /narration/status/:job_id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Job, JobResult, JobStatus, Language, NarrationResult, PanelDescriptor, TaskKind,
};
use crate::services::NarrationJob;
use crate::AppState;

/// Whether the client plays all panels in sequence or a single one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    #[default]
    All,
    Single,
}

fn default_language() -> String {
    "zh".to_string()
}

/// POST /narration/play and /narration/submit request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationRequest {
    /// Catalog voice id; the configured default when absent
    #[serde(default)]
    pub voice_id: Option<String>,
    pub panels: Vec<PanelDescriptor>,
    #[serde(default)]
    pub play_mode: PlayMode,
    #[serde(default = "default_language")]
    pub language: String,
}

/// POST /narration/play response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub audio_url: Option<String>,
    pub text: Option<String>,
    pub result: Option<NarrationResult>,
    pub duration: Option<f64>,
}

/// POST /narration/submit response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Job snapshot returned by the status endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub kind: TaskKind,
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub audio_url: Option<String>,
    pub text: Option<String>,
    pub result: Option<JobResult>,
    pub duration: Option<f64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            kind: job.kind,
            status: job.status,
            progress: job.progress(),
            audio_url: job.audio_url,
            text: job.result.as_ref().map(|r| r.summary().to_string()),
            duration: job.duration,
            error: job.error,
            created_at: job.created_at,
            completed_at: job.completed_at,
            result: job.result,
        }
    }
}

/// Look up a job of the given kind; malformed ids are simply unknown
pub(crate) async fn load_job(state: &AppState, raw_id: &str, kind: TaskKind) -> ApiResult<Job> {
    let not_found = || ApiError::NotFound(format!("Job {} not found", raw_id));
    let job_id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    let job = state.pipeline.jobs().get(job_id).await?;
    if job.kind != kind {
        return Err(not_found());
    }
    Ok(job)
}

impl NarrationRequest {
    fn into_job(self, state: &AppState) -> NarrationJob {
        NarrationJob {
            panels: self.panels,
            language: Language::from_tag(&self.language),
            voice_id: self
                .voice_id
                .unwrap_or_else(|| state.config.default_voice.clone()),
        }
    }
}

/// POST /narration/play
///
/// Runs the full pipeline and returns the finished job.
pub async fn play_narration(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<NarrationRequest>,
) -> ApiResult<Json<NarrationResponse>> {
    tracing::info!(
        org_id = ?user.org_id,
        panel_count = request.panels.len(),
        voice_id = ?request.voice_id,
        play_mode = ?request.play_mode,
        "Narration request received"
    );

    let outcome = state
        .pipeline
        .play_narration(request.into_job(&state))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Narration generation failed");
            ApiError::NarrationFailed(e.to_string())
        })?;

    Ok(Json(NarrationResponse {
        job_id: outcome.job.job_id,
        status: outcome.job.status,
        audio_url: Some(outcome.audio.audio_url),
        text: Some(outcome.result.summary.clone()),
        result: Some(outcome.result),
        duration: Some(outcome.audio.duration_seconds),
    }))
}

/// POST /narration/submit
///
/// Queues the job and returns 202; poll /narration/status for the result.
pub async fn submit_narration(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<NarrationRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let panel_count = request.panels.len();
    let job = state
        .pipeline
        .submit_narration(request.into_job(&state))
        .await
        .map_err(|e| ApiError::NarrationFailed(e.to_string()))?;

    tracing::info!(
        job_id = %job.job_id,
        org_id = ?user.org_id,
        panel_count,
        "Narration job queued"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id: job.job_id,
            status: job.status,
        }),
    ))
}

/// GET /narration/status/:job_id
pub async fn get_narration_status(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = load_job(&state, &job_id, TaskKind::Narration).await?;
    Ok(Json(job.into()))
}

/// Build narration routes
pub fn narration_routes() -> Router<AppState> {
    Router::new()
        .route("/narration/play", post(play_narration))
        .route("/narration/submit", post(submit_narration))
        .route("/narration/status/:job_id", get(get_narration_status))
}

//! Panel batch validation
//!
//! POST /panels/batch checks each panel's data shape against its metric
//! type. Invalid panels are reported as rejected items; the request itself
//! still succeeds. Nothing is stored, so lookups by id always miss and
//! deletes are acknowledged only.

use axum::{
    extract::Path,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::models::PanelDescriptor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PanelBatchRequest {
    pub panels: Vec<PanelDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelBatchResponse {
    /// True when no panel was rejected
    pub accepted: bool,
    pub accepted_count: usize,
    /// Ids of rejected panels
    pub rejected: Vec<String>,
    pub message: String,
}

/// POST /panels/batch
pub async fn batch_upload_panels(
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<PanelBatchRequest>,
) -> Json<PanelBatchResponse> {
    tracing::info!(
        org_id = ?user.org_id,
        panel_count = request.panels.len(),
        "Batch panel upload"
    );

    let mut accepted_count = 0;
    let mut rejected = Vec::new();

    for panel in &request.panels {
        match panel.validate() {
            Ok(()) => accepted_count += 1,
            Err(e) => {
                tracing::warn!(panel_id = %panel.panel_id, error = %e, "Panel validation failed");
                rejected.push(panel.panel_id.clone());
            }
        }
    }

    Json(PanelBatchResponse {
        accepted: rejected.is_empty(),
        accepted_count,
        rejected,
        message: format!("Successfully processed {} panels", accepted_count),
    })
}

#[derive(Debug, Serialize)]
pub struct PanelDeleteResponse {
    pub message: String,
}

/// GET /panels/:panel_id
pub async fn get_panel(
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(panel_id): Path<String>,
) -> ApiResult<Json<PanelDescriptor>> {
    Err(ApiError::NotFound(format!("Panel {} not found", panel_id)))
}

/// DELETE /panels/:panel_id
pub async fn delete_panel(
    AuthenticatedUser(user): AuthenticatedUser,
    Path(panel_id): Path<String>,
) -> Json<PanelDeleteResponse> {
    tracing::info!(org_id = ?user.org_id, panel_id = %panel_id, "Panel delete acknowledged");
    Json(PanelDeleteResponse {
        message: format!("Panel {} has been deleted", panel_id),
    })
}

pub fn panel_routes() -> Router<AppState> {
    Router::new()
        .route("/panels/batch", post(batch_upload_panels))
        .route("/panels/:panel_id", get(get_panel).delete(delete_panel))
}

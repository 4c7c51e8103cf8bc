//! Voice catalog endpoints

use axum::{extract::Path, routing::get, Json, Router};

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::models::Voice;
use crate::services::voice_catalog;
use crate::AppState;

/// GET /voices
pub async fn list_voices(AuthenticatedUser(_user): AuthenticatedUser) -> Json<&'static [Voice]> {
    Json(voice_catalog::all())
}

/// GET /voices/:voice_id
pub async fn get_voice(
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(voice_id): Path<String>,
) -> ApiResult<Json<&'static Voice>> {
    voice_catalog::find(&voice_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Voice {} not found", voice_id)))
}

pub fn voice_routes() -> Router<AppState> {
    Router::new()
        .route("/voices", get(list_voices))
        .route("/voices/:voice_id", get(get_voice))
}

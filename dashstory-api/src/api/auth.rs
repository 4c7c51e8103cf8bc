//! Token validation and API key management
//!
//! GET /auth/validate, POST /auth/api-keys, DELETE /auth/api-keys/:key_id

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{bearer_token, AuthenticatedUser};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    pub scopes: Vec<String>,
}

fn default_scopes() -> Vec<String> {
    vec!["read".to_string(), "write".to_string()]
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyCreate {
    pub name: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    /// Only returned at creation
    pub key: String,
    pub scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub message: String,
}

/// GET /auth/validate
///
/// Always 200; an unusable token reports `valid: false`.
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ValidateResponse> {
    let verified = bearer_token(&headers).and_then(|token| state.tokens.verify(token));

    match verified {
        Ok(claims) => Json(ValidateResponse {
            valid: true,
            org_id: claims.org_id,
            scopes: claims.scopes,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "Token validation failed");
            Json(ValidateResponse {
                valid: false,
                org_id: None,
                scopes: Vec::new(),
            })
        }
    }
}

/// POST /auth/api-keys (admin)
pub async fn create_api_key(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<ApiKeyCreate>,
) -> ApiResult<Json<ApiKeyResponse>> {
    user.require_admin("create API keys")?;

    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("API key name must not be empty".to_string()));
    }

    let org_id = user.org_id.clone().unwrap_or_default();
    let key = state
        .tokens
        .issue_api_key(&org_id, &request.name, request.scopes.clone())?;

    let response = ApiKeyResponse {
        id: Uuid::new_v4(),
        name: request.name,
        key,
        scopes: request.scopes,
        created_at: Utc::now(),
        is_active: true,
    };

    tracing::info!(
        org_id = %org_id,
        key_id = %response.id,
        name = %response.name,
        "API key issued"
    );

    Ok(Json(response))
}

/// DELETE /auth/api-keys/:key_id (admin)
///
/// Keys are stateless tokens; revocation is acknowledged and logged only.
pub async fn revoke_api_key(
    AuthenticatedUser(user): AuthenticatedUser,
    Path(key_id): Path<String>,
) -> ApiResult<Json<RevokeResponse>> {
    user.require_admin("revoke API keys")?;

    tracing::info!(org_id = ?user.org_id, key_id = %key_id, "API key revoked");
    Ok(Json(RevokeResponse {
        message: format!("API key {} has been revoked", key_id),
    }))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/validate", get(validate_token))
        .route("/auth/api-keys", post(create_api_key))
        .route("/auth/api-keys/:key_id", delete(revoke_api_key))
}

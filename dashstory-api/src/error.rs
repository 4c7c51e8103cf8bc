//! Error types for dashstory-api
//!
//! Only authentication, authorization, not-found, payload-size and
//! malformed-input errors reach callers as non-200 statuses. Inference and
//! synthesis failures are absorbed by the pipeline; what escapes it maps to
//! 500 (narration) or 422 (vision).

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::services::{ImageError, JobError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown job or voice (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Image over the decoded-size limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Malformed request input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Narration pipeline failure not absorbed by fallback (500)
    #[error("Narration generation failed: {0}")]
    NarrationFailed(String),

    /// Vision pipeline failure not absorbed by fallback (422)
    #[error("Vision interpretation failed: {0}")]
    VisionFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthError::Signing(msg) => ApiError::Internal(msg),
            AuthError::Expired => ApiError::Unauthorized("Invalid or expired token".to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => ApiError::NotFound(format!("Job {} not found", id)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            ImageError::InvalidEncoding(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NarrationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NARRATION_FAILED",
                format!("Narration generation failed: {}", msg),
            ),
            ApiError::VisionFailed(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VISION_FAILED",
                format!("Vision interpretation failed: {}", msg),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! Bearer token issuance and verification
//!
//! Tokens are HS256 JWTs. Access tokens and API keys share one claim set;
//! API keys are long-lived and carry `type = "api_key"`.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const TOKEN_TYPE_API_KEY: &str = "api_key";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    Missing,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token has expired")]
    Expired,

    #[error("{0}")]
    Forbidden(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

/// JWT claim set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub exp: i64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Identity resolved from a verified token
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub org_id: Option<String>,
    pub user_id: String,
    pub role: String,
    pub scopes: Vec<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Fail with [`AuthError::Forbidden`] unless the role is admin
    pub fn require_admin(&self, action: &str) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden(format!("Only admin can {}", action)))
        }
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            org_id: claims.org_id,
            user_id: claims.sub,
            role: claims.role,
            scopes: claims.scopes,
        }
    }
}

/// Signs and verifies tokens with one shared secret
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    api_key_ttl: Duration,
}

impl TokenAuthority {
    pub fn new(secret: &str, access_ttl_minutes: i64, api_key_ttl_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(access_ttl_minutes),
            api_key_ttl: Duration::days(api_key_ttl_days),
        }
    }

    /// Authority with a random per-process secret
    ///
    /// Tokens it issues stop verifying when the process restarts.
    pub fn ephemeral(access_ttl_minutes: i64, api_key_ttl_days: i64) -> Self {
        warn!("No JWT secret configured, generating an ephemeral signing secret");
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::new(&secret, access_ttl_minutes, api_key_ttl_days)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Issue a short-lived access token
    pub fn issue_access_token(
        &self,
        user_id: &str,
        org_id: &str,
        role: &str,
        scopes: Vec<String>,
    ) -> Result<String, AuthError> {
        self.sign(&Claims {
            sub: user_id.to_string(),
            org_id: Some(org_id.to_string()),
            role: role.to_string(),
            scopes,
            exp: (Utc::now() + self.access_ttl).timestamp(),
            token_type: None,
            name: None,
        })
    }

    /// Issue a long-lived API key for an organization
    pub fn issue_api_key(
        &self,
        org_id: &str,
        name: &str,
        scopes: Vec<String>,
    ) -> Result<String, AuthError> {
        self.sign(&Claims {
            sub: format!("api_key:{}:{}", org_id, name),
            org_id: Some(org_id.to_string()),
            role: ROLE_USER.to_string(),
            scopes,
            exp: (Utc::now() + self.api_key_ttl).timestamp(),
            token_type: Some(TOKEN_TYPE_API_KEY.to_string()),
            name: Some(name.to_string()),
        })
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e.to_string()),
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Invalid("Authorization header is not ASCII".to_string()))?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::Missing)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::Missing);
    }
    Ok(token.trim())
}

/// Extractor for handlers that require a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authority = Arc::<TokenAuthority>::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        let claims = authority.verify(token)?;
        debug!(user_id = %claims.sub, role = %claims.role, "Authenticated request");
        Ok(AuthenticatedUser(claims.into()))
    }
}

//! Bearer token authentication
//!
//! RS256 JWTs validated against the issuer's JWKS endpoint, with Cognito-style
//! audience semantics: `id` tokens carry the client id in `aud`, `access`
//! tokens carry it in `client_id`. Ownership checks compare the token's user
//! identity claim against the user id named in the request.

mod verifier;

pub use verifier::JwksVerifier;

use crate::state::AppState;
use axum::http::{header, HeaderMap};
use framevault_core::AppError;
use serde::Deserialize;

/// Claims Framevault cares about. Extra claims are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub token_use: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default, rename = "custom:user_id")]
    pub custom_user_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

impl Claims {
    /// Resolve the application user id carried by the token.
    ///
    /// Precedence: `custom:user_id`, then `user_id`, then a numeric `sub`.
    pub fn domain_user_id(&self) -> Option<i64> {
        if let Some(id) = self
            .custom_user_id
            .as_ref()
            .and_then(|s| s.parse::<i64>().ok())
        {
            return Some(id);
        }

        if let Some(value) = &self.user_id {
            if let Some(id) = value.as_i64() {
                return Some(id);
            }
            if let Some(id) = value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                return Some(id);
            }
        }

        self.sub.parse::<i64>().ok()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's identity for a request.
///
/// With authentication disabled every request runs as anonymous. When
/// enabled, a missing or invalid bearer token is a 401.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Claims>, AppError> {
    if !state.config.auth_required {
        return Ok(None);
    }

    let verifier = state
        .verifier
        .as_ref()
        .ok_or_else(|| AppError::Internal("Authentication is not configured".to_string()))?;

    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = verifier.verify(token).await?;
    Ok(Some(claims))
}

/// Reject requests that act on another user's videos.
///
/// Anonymous callers (auth disabled) pass through; an authenticated caller
/// whose identity cannot be resolved or does not match is forbidden.
pub fn enforce_same_user(claims: Option<&Claims>, requested_user_id: i64) -> Result<(), AppError> {
    let Some(claims) = claims else {
        return Ok(());
    };

    match claims.domain_user_id() {
        Some(id) if id == requested_user_id => Ok(()),
        _ => Err(AppError::Forbidden(
            "Cannot access another user's videos".to_string(),
        )),
    }
}

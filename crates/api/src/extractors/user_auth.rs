//! Bearer token authentication extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::AuthService;

/// Authenticated account resolved from a session token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub account_id: Uuid,
    /// JWT ID, which is also the session key.
    pub jti: String,
}

/// Returns the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }

        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::Unauthorized("Missing or malformed Authorization header".to_string())
        })?;

        let auth = AuthService::from_state(state).authenticate(token).await?;
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}

/// Authentication that does not reject anonymous callers.
///
/// A missing header yields `None`; a present but invalid token is still
/// rejected so a stale session is never silently treated as a guest.
#[derive(Debug, Clone)]
pub struct OptionalUserAuth(pub Option<UserAuth>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalUserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get("Authorization").is_none() {
            return Ok(OptionalUserAuth(None));
        }
        UserAuth::from_request_parts(parts, state)
            .await
            .map(|auth| OptionalUserAuth(Some(auth)))
    }
}

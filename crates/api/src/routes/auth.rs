//! Account routes: sign-up, sign-in, sign-out and session lookup.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domain::models::Account;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::auth::{AuthResult, AuthService};

/// Request body for account registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_account_password"))]
    pub password: String,

    #[validate(
        length(min = 1, max = 30, message = "Username must be 1-30 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub username: String,

    /// Falls back to the configured default region.
    #[validate(custom(function = "shared::validation::validate_region"))]
    pub region: Option<String>,
}

/// Request body for sign-in.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Account information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub region: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email,
            username: account.username,
            region: account.region,
            is_premium: account.is_premium,
            created_at: account.created_at,
        }
    }
}

/// Token information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Response body for sign-up and sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub account: AccountResponse,
    pub token: TokenResponse,
}

impl From<AuthResult> for SessionResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            account: result.account.into(),
            token: TokenResponse {
                access_token: result.token.token,
                token_type: "Bearer".to_string(),
                expires_in: result.token.expires_in,
                expires_at: result.token.expires_at,
            },
        }
    }
}

/// Register a new account.
///
/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    request.validate()?;

    let region = request
        .region
        .as_deref()
        .unwrap_or(&state.config.limits.default_region);

    let result = AuthService::from_state(&state)
        .sign_up(
            &request.email,
            &request.password,
            request.username.trim(),
            region,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Sign in with email and password.
///
/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    request.validate()?;

    let result = AuthService::from_state(&state)
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(result.into()))
}

/// Revoke the current session.
///
/// POST /api/v1/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<StatusCode, ApiError> {
    AuthService::from_state(&state).sign_out(&auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return the account behind the current session.
///
/// GET /api/v1/auth/session
pub async fn session(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = AuthService::from_state(&state)
        .account(auth.account_id)
        .await?;
    Ok(Json(account.into()))
}

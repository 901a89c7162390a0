//! Account registration, sign-in and session management.

use std::sync::Arc;

use domain::models::Account;
use persistence::repositories::{AccountRepository, SessionRepository};
use shared::jwt::{IssuedToken, JwtError, SessionSigner};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Session has been revoked")]
    SessionRevoked,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::conflict("Email already registered"),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::InvalidToken | AuthError::Token(JwtError::Expired) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::Token(JwtError::Decoding(_)) | AuthError::Token(JwtError::Invalid) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::SessionRevoked => {
                ApiError::Unauthorized("Session has been signed out".to_string())
            }
            AuthError::AccountNotFound => ApiError::Unauthorized("Account not found".to_string()),
            AuthError::Token(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::Password(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// A signed-in account and its fresh session token.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub account: Account,
    pub token: IssuedToken,
}

/// Authentication service.
pub struct AuthService {
    accounts: AccountRepository,
    sessions: SessionRepository,
    signer: Arc<SessionSigner>,
}

impl AuthService {
    pub fn new(pool: PgPool, signer: Arc<SessionSigner>) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
            signer,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.pool.clone(), state.signer.clone())
    }

    /// Registers a new account and opens its first session.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
        region: &str,
    ) -> Result<AuthResult, AuthError> {
        if self.accounts.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let entity = match self
            .accounts
            .create(&email.to_lowercase(), &password_hash, username, region)
            .await
        {
            Ok(entity) => entity,
            // Concurrent registration of the same address.
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists)
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.open_session(entity.id).await?;
        tracing::info!(account_id = %entity.id, region = %entity.region, "Account created");

        Ok(AuthResult {
            account: entity.into(),
            token,
        })
    }

    /// Verifies credentials and opens a new session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let entity = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &entity.password_hash)? {
            tracing::info!(account_id = %entity.id, "Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let purged = self.sessions.delete_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions removed");
        }

        let token = self.open_session(entity.id).await?;
        tracing::info!(account_id = %entity.id, "Signed in");

        Ok(AuthResult {
            account: entity.into(),
            token,
        })
    }

    /// Revokes the session behind a token.
    pub async fn sign_out(&self, auth: &UserAuth) -> Result<(), AuthError> {
        if !self.sessions.delete_by_jti(&auth.jti).await? {
            return Err(AuthError::SessionRevoked);
        }
        tracing::info!(account_id = %auth.account_id, "Signed out");
        Ok(())
    }

    /// Validates a bearer token and its backing session.
    pub async fn authenticate(&self, token: &str) -> Result<UserAuth, AuthError> {
        let claims = self.signer.validate(token)?;
        let account_id = claims.account_id().map_err(|_| AuthError::InvalidToken)?;

        let session = self
            .sessions
            .find_active(&claims.jti)
            .await?
            .ok_or(AuthError::SessionRevoked)?;

        if session.account_id != account_id {
            tracing::warn!(account_id = %account_id, "Token subject does not match session");
            return Err(AuthError::InvalidToken);
        }

        Ok(UserAuth {
            account_id,
            jti: claims.jti,
        })
    }

    /// Loads the account behind an authenticated request.
    pub async fn account(&self, account_id: Uuid) -> Result<Account, AuthError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .map(Account::from)
            .ok_or(AuthError::AccountNotFound)
    }

    async fn open_session(&self, account_id: Uuid) -> Result<IssuedToken, AuthError> {
        let token = self.signer.issue(account_id)?;
        self.sessions
            .create(account_id, &token.jti, token.expires_at)
            .await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn status(err: AuthError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_auth_error_status_mapping() {
        assert_eq!(status(AuthError::EmailAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::SessionRevoked), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::Token(JwtError::Expired)), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(AuthError::Token(JwtError::Encoding("bad key".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::EmailAlreadyExists.to_string(),
            "Email already registered"
        );
        assert_eq!(AuthError::SessionRevoked.to_string(), "Session has been revoked");
    }
}

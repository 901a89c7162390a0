//! JWT session tokens (HS256).
//!
//! Tokens carry the account id as subject and a `jti` that is stored as a
//! session row, so signing out revokes the token server-side.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    Encoding(String),

    #[error("Failed to decode token: {0}")]
    Decoding(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    /// Session identifier
    pub jti: String,
}

impl Claims {
    /// Parses the subject as an account ID.
    pub fn account_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::Invalid)
    }
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

/// Signing and validation keys plus token lifetime.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
    leeway_secs: u64,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl SessionSigner {
    pub fn new(secret: &str, expiry_secs: i64, leeway_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            leeway_secs,
        }
    }

    /// Signs a new session token for the account.
    pub fn issue(&self, account_id: Uuid) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.expiry_secs);
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: account_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
            expires_in: self.expiry_secs,
        })
    }

    /// Validates signature and expiry and returns the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::Invalid,
                _ => JwtError::Decoding(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret-with-enough-entropy-123", 3600, 0)
    }

    #[test]
    fn test_issue_and_validate() {
        let signer = signer();
        let account_id = Uuid::new_v4();

        let issued = signer.issue(account_id).unwrap();
        let claims = signer.validate(&issued.token).unwrap();

        assert_eq!(claims.account_id().unwrap(), account_id);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(issued.expires_in, 3600);
    }

    #[test]
    fn test_unique_jti() {
        let signer = signer();
        let id = Uuid::new_v4();
        assert_ne!(signer.issue(id).unwrap().jti, signer.issue(id).unwrap().jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = SessionSigner::new("test-secret-with-enough-entropy-123", -120, 0);
        let issued = signer.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(signer.validate(&issued.token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issued = signer().issue(Uuid::new_v4()).unwrap();
        let other = SessionSigner::new("another-secret-with-enough-entropy", 3600, 0);
        assert!(matches!(other.validate(&issued.token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(signer().validate("not-a-token").is_err());
    }

    #[test]
    fn test_bad_subject() {
        let claims = Claims {
            sub: "nope".into(),
            exp: 0,
            iat: 0,
            jti: "x".into(),
        };
        assert!(matches!(claims.account_id(), Err(JwtError::Invalid)));
    }
}

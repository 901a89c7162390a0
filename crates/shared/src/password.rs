//! Password hashing with Argon2id.
//!
//! Used for account passwords and for the access password of private wishes.
//! Plaintext never reaches the database; comparison goes through
//! `PasswordVerifier`, which is constant-time over the derived hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to verify password: {0}")]
    Verify(String),

    #[error("Stored password hash is not a valid PHC string")]
    InvalidHashFormat,
}

// OWASP 2024 baseline: 19 MiB, 2 passes, 1 lane.
const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::Hash(format!("invalid Argon2 params: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password and returns a PHC string (`$argon2id$v=19$...`).
///
/// # Example
/// ```
/// use shared::password::{hash_password, verify_password};
///
/// let hash = hash_password("secret").unwrap();
/// assert!(verify_password("secret", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks a submitted password against a stored PHC hash.
///
/// Exact-match semantics: `Ok(false)` for any difference, including case
/// and surrounding whitespace. The parameters are read from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id_params() {
        let hash = hash_password("secret").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_hash_is_salted() {
        assert_ne!(hash_password("secret").unwrap(), hash_password("secret").unwrap());
    }

    #[test]
    fn test_verify_match() {
        let hash = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hash).unwrap());
    }

    #[test]
    fn test_verify_is_exact_match() {
        let hash = hash_password("secret").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
        assert!(!verify_password("Secret", &hash).unwrap());
        assert!(!verify_password("secret ", &hash).unwrap());
        assert!(!verify_password("secre", &hash).unwrap());
    }

    #[test]
    fn test_verify_unicode() {
        let hash = hash_password("joyeux-anniversaire-🎂").unwrap();
        assert!(verify_password("joyeux-anniversaire-🎂", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_plaintext_column() {
        // A legacy plaintext value is not a PHC string.
        let result = verify_password("secret", "secret");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }
}

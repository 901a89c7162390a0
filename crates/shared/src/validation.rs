//! Common validation utilities shared by request DTOs.

use validator::ValidationError;

/// Minimum length of a private wish password.
pub const MIN_WISH_PASSWORD_LENGTH: usize = 6;

lazy_static::lazy_static! {
    /// Region codes are short uppercase tokens such as `NA`, `EU` or `AS`.
    pub static ref REGION_REGEX: regex::Regex = regex::Regex::new(r"^[A-Z0-9]{2,8}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a region code used as the first path segment.
pub fn validate_region(region: &str) -> Result<(), ValidationError> {
    if REGION_REGEX.is_match(region) {
        Ok(())
    } else {
        Err(error(
            "region_format",
            "Region must be 2-8 uppercase letters or digits",
        ))
    }
}

/// Validates that a value has non-whitespace content.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value cannot be blank"))
    } else {
        Ok(())
    }
}

/// Validates the password chosen for a private wish.
pub fn validate_wish_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_WISH_PASSWORD_LENGTH {
        Ok(())
    } else {
        Err(error(
            "password_length",
            "Private wishes need a password of at least 6 characters",
        ))
    }
}

/// Validates an account password at sign-up.
pub fn validate_account_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err(error(
            "password_strength",
            "Password must be at least 8 characters and contain a letter and a digit",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_region() {
        assert!(validate_region("NA").is_ok());
        assert!(validate_region("AS").is_ok());
        assert!(validate_region("EU2").is_ok());
        assert!(validate_region("na").is_err());
        assert!(validate_region("N").is_err());
        assert!(validate_region("N/A").is_err());
        assert!(validate_region("TOOLONGREGION").is_err());
    }

    #[test]
    fn test_validate_region_message() {
        let err = validate_region("x").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Region must be 2-8 uppercase letters or digits"
        );
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Sam").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_wish_password() {
        assert!(validate_wish_password("secret").is_ok());
        assert!(validate_wish_password("12345").is_err());
        assert!(validate_wish_password("").is_err());
    }

    #[test]
    fn test_validate_account_password() {
        assert!(validate_account_password("birthday2025").is_ok());
        assert!(validate_account_password("short1").is_err());
        assert!(validate_account_password("nodigitshere").is_err());
        assert!(validate_account_password("1234567890").is_err());
    }
}

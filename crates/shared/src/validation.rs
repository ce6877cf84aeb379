//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of a project, environment or flag name.
pub const MAX_NAME_LEN: usize = 64;

/// Minimum length of an account password.
pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref RESOURCE_NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9_]{3,32}$").unwrap();
}

/// Validates a project, environment or flag name.
///
/// Names are 1 to 64 characters of letters, digits, `_`, `.` and `-`. They
/// end up in cache keys and URL path segments, so separators such as `:` and
/// `/` are rejected.
pub fn validate_resource_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        let mut err = ValidationError::new("name_length");
        err.message = Some(format!("Name must be between 1 and {} characters", MAX_NAME_LEN).into());
        return Err(err);
    }

    if !RESOURCE_NAME_RE.is_match(name) {
        let mut err = ValidationError::new("name_format");
        err.message =
            Some("Name may only contain letters, digits, '_', '.' and '-'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a username: 3 to 32 lowercase letters, digits or underscores.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_format");
        err.message = Some(
            "Username must be 3-32 characters of lowercase letters, digits or '_'".into(),
        );
        Err(err)
    }
}

/// Validates password length.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_length");
        err.message =
            Some(format!("Password must be at least {} characters", MIN_PASSWORD_LEN).into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_resource_name_valid() {
        assert!(validate_resource_name("prod").is_ok());
        assert!(validate_resource_name("dark-mode").is_ok());
        assert!(validate_resource_name("new_checkout.v2").is_ok());
        assert!(validate_resource_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_validate_resource_name_length() {
        let err = validate_resource_name("").unwrap_err();
        assert_eq!(err.code, "name_length");

        let err = validate_resource_name(&"a".repeat(MAX_NAME_LEN + 1)).unwrap_err();
        assert_eq!(err.code, "name_length");
    }

    #[test]
    fn test_validate_resource_name_rejects_separators() {
        for name in ["a:b", "a/b", "a b", "ünïcode"] {
            let err = validate_resource_name(name).unwrap_err();
            assert_eq!(err.code, "name_format", "name {:?}", name);
        }
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("Alice").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }
}

/// Input validators for user and chirp payloads
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Email validation (simplified RFC 5322)
/// 3. bcrypt-compatible password limits

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64;
/// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;
pub const MAX_CHIRP_LENGTH: usize = 140;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a plaintext password before hashing
///
/// Passwords are taken verbatim (no trimming).
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES));
    }

    Ok(())
}

/// Validates a chirp body. Length is counted in characters.
pub fn is_valid_chirp_body(body: &str) -> Result<(), ValidationError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH));
    }

    Ok(())
}

fn has_suspicious_email_patterns(email: &str) -> bool {
    if let Some(at_pos) = email.find('@') {
        if email[..at_pos].len() > MAX_LOCAL_PART_LENGTH {
            return true;
        }
    }

    if email.matches('@').count() != 1 {
        return true;
    }

    email.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert_eq!(is_valid_email("  walt@breakingbad.com ").unwrap(), "walt@breakingbad.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            is_valid_email(&too_long),
            Err(ValidationError::TooLong(_, _))
        ));

        assert!(matches!(
            is_valid_email("a@b"),
            Err(ValidationError::TooShort(_, _))
        ));
        assert!(matches!(is_valid_email("   "), Err(ValidationError::EmptyField(_))));
    }

    #[test]
    fn test_oversized_local_part_is_suspicious() {
        let email = format!("{}@example.com", "a".repeat(65));
        assert!(matches!(
            is_valid_email(&email),
            Err(ValidationError::SuspiciousContent(_))
        ));
    }

    #[test]
    fn test_password_limits() {
        assert!(is_valid_password("04234").is_ok());
        assert!(is_valid_password(&"x".repeat(72)).is_ok());
        assert!(matches!(is_valid_password(""), Err(ValidationError::EmptyField(_))));
        assert!(matches!(
            is_valid_password(&"x".repeat(73)),
            Err(ValidationError::TooLong(_, 72))
        ));
    }

    #[test]
    fn test_chirp_length() {
        assert!(is_valid_chirp_body("").is_ok());
        assert!(is_valid_chirp_body(&"a".repeat(140)).is_ok());
        assert!(is_valid_chirp_body(&"é".repeat(140)).is_ok());
        assert!(is_valid_chirp_body(&"a".repeat(141)).is_err());
    }
}

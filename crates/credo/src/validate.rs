// Input validation for the lifecycle operations.
//
// Emails are normalized (trimmed, lowercased) before any store lookup so
// uniqueness and login are case-insensitive. Validation failures carry a
// caller-facing message.

use credo_core::error::{AuthError, Result};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: one `@` with non-empty local part and a domain
/// containing a dot. Deliverability is the notifier's problem.
pub fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation("Please provide a valid email address".into()))
    }
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AuthError::Validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> Result<()> {
    if password.chars().count() < min_len {
        return Err(AuthError::Validation(format!(
            "Password must be at least {min_len} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn username_bounds() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("12345678", 8).is_ok());
        assert!(validate_password("1234567", 8).is_err());
    }
}

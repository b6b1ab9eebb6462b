//! Local form validation.
//!
//! These checks run before any collaborator is called; a failing form never
//! leaves the process.

use std::fmt;

/// Lowest and highest accepted star rating.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingCredentials,
    PasswordTooShort { min: usize },
    PasswordMismatch,
    RatingOutOfRange(u8),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingCredentials => write!(f, "Provide email and password"),
            FormError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            FormError::PasswordMismatch => write!(f, "Passwords do not match"),
            FormError::RatingOutOfRange(_) => write!(f, "Select a rating 1-10"),
        }
    }
}

impl std::error::Error for FormError {}

/// Validates the sign-in form.
///
/// # Errors
/// Returns `MissingCredentials` if either field is blank.
pub fn sign_in(email: &str, password: &str) -> Result<(), FormError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(FormError::MissingCredentials);
    }
    Ok(())
}

/// Validates the sign-up form.
///
/// # Errors
/// Returns the first failing rule: blank fields, short password, then
/// mismatched confirmation.
pub fn sign_up(
    email: &str,
    password: &str,
    confirm: &str,
    min_password_len: usize,
) -> Result<(), FormError> {
    sign_in(email, password)?;
    if password.chars().count() < min_password_len {
        return Err(FormError::PasswordTooShort {
            min: min_password_len,
        });
    }
    if password != confirm {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}

/// Validates a new password (profile password change).
///
/// # Errors
/// Same rules as [`sign_up`] minus the email.
pub fn new_password(password: &str, confirm: &str, min_password_len: usize) -> Result<(), FormError> {
    if password.is_empty() {
        return Err(FormError::MissingCredentials);
    }
    if password.chars().count() < min_password_len {
        return Err(FormError::PasswordTooShort {
            min: min_password_len,
        });
    }
    if password != confirm {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}

/// Validates a star rating.
///
/// # Errors
/// Returns `RatingOutOfRange` outside 1-10.
pub fn rating(score: u8) -> Result<u8, FormError> {
    if RATING_RANGE.contains(&score) {
        Ok(score)
    } else {
        Err(FormError::RatingOutOfRange(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_requires_both_fields() {
        assert_eq!(sign_in("", "secret"), Err(FormError::MissingCredentials));
        assert_eq!(sign_in("  ", "secret"), Err(FormError::MissingCredentials));
        assert_eq!(sign_in("a@b.com", ""), Err(FormError::MissingCredentials));
        assert!(sign_in("a@b.com", "secret").is_ok());
    }

    #[test]
    fn test_sign_up_rule_order() {
        assert_eq!(
            sign_up("a@b.com", "abc", "xyz", 6),
            Err(FormError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            sign_up("a@b.com", "secret1", "secret2", 6),
            Err(FormError::PasswordMismatch)
        );
        assert!(sign_up("a@b.com", "secret1", "secret1", 6).is_ok());
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            FormError::PasswordTooShort { min: 6 }.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            FormError::MissingCredentials.to_string(),
            "Provide email and password"
        );
    }

    #[test]
    fn test_rating_bounds() {
        assert!(rating(0).is_err());
        assert_eq!(rating(1), Ok(1));
        assert_eq!(rating(10), Ok(10));
        assert_eq!(rating(11), Err(FormError::RatingOutOfRange(11)));
    }

    #[test]
    fn test_new_password() {
        assert_eq!(new_password("", "", 6), Err(FormError::MissingCredentials));
        assert!(new_password("longenough", "longenough", 6).is_ok());
    }
}

/// Password hashing and verification
///
/// bcrypt key-stretching for stored credentials, plus password strength
/// validation applied when an administrator creates or updates a user.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt only considers the first 72 bytes of input
const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns error if the password fails strength validation or hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored bcrypt hash.
///
/// Never fails on a mismatch; a malformed stored hash is logged and treated
/// as a verification failure rather than surfaced as an error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match verify(password, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Validate password strength requirements
///
/// Requirements:
/// - 8 to 72 characters
/// - At least one digit
/// - At least one lowercase letter
/// - At least one uppercase letter
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            format!("password must be at least {} characters", MIN_PASSWORD_LENGTH),
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let password = "CorrectHorse1";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn wrong_password_verifies_false() {
        let hash = hash_password("CorrectHorse1").expect("Failed to hash password");

        assert!(!verify_password("WrongHorse1", &hash));
    }

    #[test]
    fn malformed_stored_hash_verifies_false_without_panicking() {
        assert!(!verify_password("CorrectHorse1", "not-a-bcrypt-hash"));
        assert!(!verify_password("CorrectHorse1", ""));
    }

    #[test]
    fn too_short_password_rejected() {
        assert!(hash_password("Ab1").is_err());
    }

    #[test]
    fn too_long_password_rejected() {
        let long_password = format!("Aa1{}", "a".repeat(MAX_PASSWORD_LENGTH));
        assert!(hash_password(&long_password).is_err());
    }

    #[test]
    fn passwords_missing_a_character_class_rejected() {
        assert!(hash_password("nodigitspassword").is_err());
        assert!(hash_password("NOLOWERCASE1").is_err());
        assert!(hash_password("nouppercase1").is_err());
    }
}

/// Input validation for the HTTP boundary

use crate::error::ValidationError;

const MAX_USER_NAME_LENGTH: usize = 64;

/// Validate a user name submitted through the admin endpoints.
///
/// Accepts 1-64 characters of letters, digits, `.`, `_`, and `-`; the name
/// is trimmed and lowercased (lookups are case-insensitive everywhere).
pub fn is_valid_user_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("user_name".to_string()));
    }

    if trimmed.len() > MAX_USER_NAME_LENGTH {
        return Err(ValidationError::TooLong(
            "user_name".to_string(),
            MAX_USER_NAME_LENGTH,
        ));
    }

    let acceptable = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !acceptable {
        return Err(ValidationError::InvalidFormat(
            "user_name may only contain letters, digits, '.', '_', and '-'".to_string(),
        ));
    }

    Ok(trimmed.to_lowercase())
}

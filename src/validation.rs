//! Input validation for link creation, independent of the storage schema

use thiserror::Error;
use url::Url;

/// Minimum alias length
pub const ALIAS_MIN_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

fn is_alias_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Check a caller-supplied alias: length first, then character set, then the
/// optional upper bound.
pub fn validate_alias(alias: &str, max_length: Option<usize>) -> Result<(), ValidationError> {
    let length = alias.chars().count();

    if length < ALIAS_MIN_LENGTH {
        return Err(ValidationError::new(
            "alias",
            format!("String must contain at least {ALIAS_MIN_LENGTH} character(s)"),
        ));
    }

    if !alias.chars().all(is_alias_char) {
        return Err(ValidationError::new("alias", "Alias must be alphanumeric"));
    }

    if let Some(max_length) = max_length.filter(|&max| length > max) {
        return Err(ValidationError::new(
            "alias",
            format!("String must contain at most {max_length} character(s)"),
        ));
    }

    Ok(())
}

/// Check that the destination parses as an absolute URL. The input is never
/// rewritten.
pub fn validate_original_url(original_url: Option<&str>) -> Result<&str, ValidationError> {
    let original_url =
        original_url.ok_or_else(|| ValidationError::new("originalUrl", "Required"))?;

    Url::parse(original_url)
        .map(|_| original_url)
        .map_err(|_| ValidationError::new("originalUrl", "Invalid URL format"))
}

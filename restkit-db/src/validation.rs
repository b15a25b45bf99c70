//! Validation for names interpolated into SQL
//!
//! Database and table names cannot be bound as query parameters, so they are
//! checked before being formatted into a statement.

use std::fmt;

/// Longest identifier accepted (Postgres truncates at 63 bytes)
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Validation error for SQL names and tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format
    InvalidFormat {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat {
                field,
                value,
                reason,
            } => {
                write!(f, "{} '{}': {}", field, value, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Accept `[A-Za-z0-9_]+`, not starting with a digit.
pub fn validate_identifier<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    check_len(field, value)?;

    if value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_owned(),
            reason: "must not start with a digit",
        });
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_owned(),
            reason: "only ASCII letters, digits and '_' are allowed",
        });
    }

    Ok(value)
}

/// Accept collation/encoding tokens such as `en_US.utf8` or `utf8mb4_unicode_ci`.
pub fn validate_token<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    check_len(field, value)?;

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_owned(),
            reason: "only ASCII letters, digits, '_', '.' and '-' are allowed",
        });
    }

    Ok(value)
}

fn check_len(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_IDENTIFIER_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "database",
            max: 63,
        };
        assert_eq!(
            err.to_string(),
            "database exceeds maximum length of 63 characters"
        );
    }

    #[test]
    fn identifiers() {
        assert_eq!(validate_identifier("table", "users_2"), Ok("users_2"));
        assert!(matches!(
            validate_identifier("table", ""),
            Err(ValidationError::Empty { field: "table" })
        ));
        assert!(validate_identifier("table", "2users").is_err());
        assert!(validate_identifier("table", "users; DROP TABLE x").is_err());
        assert!(validate_identifier("table", &"a".repeat(64)).is_err());
    }

    #[test]
    fn tokens() {
        assert!(validate_token("encoding", "en_US.utf8").is_ok());
        assert!(validate_token("encoding", "utf8mb4_unicode_ci").is_ok());
        assert!(validate_token("encoding", "x' OR '1'='1").is_err());
    }
}

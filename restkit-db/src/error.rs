//! Database error type

use crate::dialect::SqlDialect;
use crate::validation::ValidationError;

pub type DbResult<T> = Result<T, DbError>;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid name: {0}")]
    Validation(#[from] ValidationError),

    #[error("unknown SQL dialect '{0}'")]
    UnknownDialect(String),

    #[error("{operation} is not supported for {dialect}")]
    UnsupportedDialect {
        dialect: SqlDialect,
        operation: &'static str,
    },

    #[error("invalid {dialect} connection string: {reason}")]
    InvalidConnectionString { dialect: SqlDialect, reason: String },

    #[error("database '{name}' does not exist")]
    DatabaseMissing { name: String },
}

impl DbError {
    pub(crate) fn unsupported(dialect: SqlDialect, operation: &'static str) -> Self {
        Self::UnsupportedDialect { dialect, operation }
    }

    pub(crate) fn invalid_conn_str(dialect: SqlDialect, reason: impl Into<String>) -> Self {
        Self::InvalidConnectionString {
            dialect,
            reason: reason.into(),
        }
    }
}

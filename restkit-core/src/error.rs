//! Structured error types for restkit-core.
//!
//! Library consumers get `thiserror` enums; the `restkit` binary wraps them
//! in `anyhow` at the edge.

use thiserror::Error;

/// Main error type for restkit-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestkitError {
    /// Configured origin cannot be written as a header value
    #[error("Invalid CORS origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    /// Method token could not be parsed
    #[error("Invalid HTTP method '{method}'")]
    InvalidMethod { method: String },

    /// OPTIONS on a CORS-tracked path is answered by the registry itself
    #[error("OPTIONS handler for '{path}' is reserved for CORS preflight")]
    PreflightConflict { path: String },
}

/// Result type alias for restkit-core operations
pub type Result<T> = std::result::Result<T, RestkitError>;

impl RestkitError {
    /// Create an invalid origin error
    pub fn invalid_origin(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOrigin {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid method error
    pub fn invalid_method(method: impl Into<String>) -> Self {
        Self::InvalidMethod {
            method: method.into(),
        }
    }

    /// Create a preflight conflict error
    pub fn preflight_conflict(path: impl Into<String>) -> Self {
        Self::PreflightConflict { path: path.into() }
    }
}

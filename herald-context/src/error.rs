//! Error types for platform lookups
//!
//! Lookups resolve the guild, channel, and role data a requirement needs.
//! Implementations backed by a remote API or a cache report their failures
//! through these errors.

use thiserror::Error;

/// Lookup error types.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform refused the request
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backing store or API could not be reached
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;

impl LookupError {
    /// Check if this error should be logged at error level.
    ///
    /// Missing entities are expected (deleted channels, departed members) and
    /// are not server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, LookupError::Unavailable(_) | LookupError::Internal(_))
    }

    /// Get error code for logs and telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            LookupError::NotFound(_) => "NOT_FOUND",
            LookupError::Forbidden(_) => "FORBIDDEN",
            LookupError::Unavailable(_) => "UNAVAILABLE",
            LookupError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

//! Error types for requirement evaluation and permission resolution

use herald_context::LookupError;
use thiserror::Error;

/// Error returned by a custom requirement check.
///
/// Custom checks are caller-supplied; this carries their failure reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CheckError(pub String);

impl CheckError {
    /// Create a new check error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<&str> for CheckError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for CheckError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Requirement evaluation error types.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The lookup collaborator failed
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// A custom check faulted
    #[error("Custom check '{label}' failed: {source}")]
    Custom {
        /// Label of the custom requirement
        label: String,
        /// Underlying check error
        #[source]
        source: CheckError,
    },
}

/// Result type for requirement evaluation.
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Permission resolution error types.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// A requirement could not be evaluated and the fault policy aborts
    #[error("Failed to evaluate requirement {requirement}: {source}")]
    Evaluation {
        /// Display form of the faulted requirement
        requirement: String,
        /// Underlying evaluation error
        #[source]
        source: EvaluationError,
    },
}

/// Result type for permission resolution.
pub type ResolveResult<T> = Result<T, PermissionError>;

impl EvaluationError {
    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        match self {
            EvaluationError::Lookup(e) => e.is_server_error(),
            EvaluationError::Custom { .. } => false,
        }
    }

    /// Get error code for logs and telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            EvaluationError::Lookup(e) => e.error_code(),
            EvaluationError::Custom { .. } => "CUSTOM_CHECK_FAILED",
        }
    }
}

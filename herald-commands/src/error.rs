//! Command errors

use herald_permissions::PermissionError;
use thiserror::Error;

/// Command error types.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The invocation was denied
    #[error("Permission denied for command: {0}")]
    PermissionDenied(String),

    /// Permission resolution aborted on a faulted requirement
    #[error("Permission check aborted: {0}")]
    Permission(#[from] PermissionError),

    /// Arguments were missing or malformed
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// The command handler failed
    #[error("Command execution failed: {0}")]
    ExecutionError(String),

    /// The command handler panicked
    #[error("Command panicked: {0}")]
    Panicked(String),
}

/// Result type for command execution.
pub type ExecutionResult<T> = Result<T, CommandError>;

impl CommandError {
    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        CommandError::ExecutionError(message.into())
    }

    /// Create an invalid-arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CommandError::InvalidArgs(message.into())
    }

    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            CommandError::Permission(_) | CommandError::Panicked(_)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CommandError::PermissionDenied(_) => "PERMISSION_DENIED",
            CommandError::Permission(_) => "PERMISSION_FAULT",
            CommandError::InvalidArgs(_) => "INVALID_ARGS",
            CommandError::ExecutionError(_) => "EXECUTION_ERROR",
            CommandError::Panicked(_) => "COMMAND_PANICKED",
        }
    }
}

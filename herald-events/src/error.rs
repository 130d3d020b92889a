//! Event intake errors

use thiserror::Error;

/// Event intake error types.
#[derive(Debug, Error)]
pub enum EventError {
    /// The event loop has shut down
    #[error("Event channel closed")]
    ChannelClosed,

    /// The bounded channel is full
    #[error("Event channel full (capacity {0})")]
    ChannelFull(usize),

    /// A handler failed to process an event
    #[error("Handler error: {0}")]
    HandlerError(String),

    /// Invalid event loop setup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;

impl EventError {
    /// Check if this error indicates the intake is gone for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, EventError::ChannelClosed)
    }

    /// Get error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            EventError::ChannelClosed => "CHANNEL_CLOSED",
            EventError::ChannelFull(_) => "CHANNEL_FULL",
            EventError::HandlerError(_) => "HANDLER_ERROR",
            EventError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

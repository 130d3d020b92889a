//! Denial feedback
//!
//! When an invocation is denied, the dispatcher hands a [`Denial`] to a
//! [`FeedbackSink`]. Rendering and delivery belong to the sink; delivery
//! failures are logged by the dispatcher and never change the outcome.

use crate::definition::FeedbackType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_context::InvocationContext;
use herald_permissions::PermissionResult;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Feedback delivery errors.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// The platform refused or failed the delivery
    #[error("Feedback delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Result type for feedback delivery.
pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// A denied invocation to report.
#[derive(Debug, Clone)]
pub struct Denial {
    /// Denied command name
    pub command: String,

    /// Where to report
    pub feedback: FeedbackType,

    /// The denied invocation
    pub invocation: InvocationContext,

    /// The decision, including failed requirements
    pub permission: PermissionResult,

    /// When the denial happened
    pub denied_at: DateTime<Utc>,
}

impl Denial {
    /// Create a denial stamped with the current time.
    pub fn new(
        command: impl Into<String>,
        feedback: FeedbackType,
        invocation: InvocationContext,
        permission: PermissionResult,
    ) -> Self {
        Self {
            command: command.into(),
            feedback,
            invocation,
            permission,
            denied_at: Utc::now(),
        }
    }
}

/// Delivers denial feedback.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Deliver one denial.
    async fn deliver(&self, denial: &Denial) -> FeedbackResult<()>;
}

/// Sink that drops every denial.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

#[async_trait]
impl FeedbackSink for NoopFeedback {
    async fn deliver(&self, _denial: &Denial) -> FeedbackResult<()> {
        Ok(())
    }
}

/// Sink that records denials in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedback {
    denials: Arc<RwLock<Vec<Denial>>>,
}

impl MemoryFeedback {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded denials, oldest first.
    pub async fn denials(&self) -> Vec<Denial> {
        self.denials.read().await.clone()
    }

    /// Number of recorded denials.
    pub async fn len(&self) -> usize {
        self.denials.read().await.len()
    }

    /// Check if nothing was recorded.
    pub async fn is_empty(&self) -> bool {
        self.denials.read().await.is_empty()
    }
}

#[async_trait]
impl FeedbackSink for MemoryFeedback {
    async fn deliver(&self, denial: &Denial) -> FeedbackResult<()> {
        self.denials.write().await.push(denial.clone());
        Ok(())
    }
}

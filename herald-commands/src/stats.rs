//! Dispatch statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of dispatch counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DispatchStats {
    /// Inputs received by the dispatcher
    pub received: u64,

    /// Inputs skipped because the author is a bot
    pub ignored: u64,

    /// Inputs that matched no command
    pub unmatched: u64,

    /// Matched invocations denied by permissions
    pub rejected: u64,

    /// Commands that ran and returned a result
    pub completed: u64,

    /// Commands that errored or panicked
    pub failed: u64,

    /// Denials the feedback sink failed to deliver
    pub feedback_failures: u64,

    /// Share of executed commands that completed (0.0 - 1.0)
    pub success_rate: f64,
}

/// Lock-free dispatch counters.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    received: AtomicU64,
    ignored: AtomicU64,
    unmatched: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    feedback_failures: AtomicU64,
}

impl DispatchMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unmatched(&self) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_feedback_failure(&self) {
        self.feedback_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values.
    pub fn snapshot(&self) -> DispatchStats {
        let completed = self.completed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let executed = completed + failed;

        DispatchStats {
            received: self.received.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed,
            failed,
            feedback_failures: self.feedback_failures.load(Ordering::Relaxed),
            success_rate: if executed > 0 {
                completed as f64 / executed as f64
            } else {
                1.0
            },
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.received,
            &self.ignored,
            &self.unmatched,
            &self.rejected,
            &self.completed,
            &self.failed,
            &self.feedback_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

//! Dispatch configuration.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for local development.

use herald_permissions::FaultPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Dispatcher and event intake configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Capacity of the inbound event channel and cap on in-flight dispatches.
    pub event_capacity: usize,

    /// Handling of requirements whose evaluation faults.
    pub fault_policy: FaultPolicy,

    /// Whether messages authored by bots are ignored.
    pub ignore_bots: bool,

    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Whether logs are emitted as JSON.
    pub log_json: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
            fault_policy: FaultPolicy::default(),
            ignore_bots: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl DispatchConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HERALD_EVENT_CAPACITY`: Inbound event channel capacity (default: 256)
    /// - `HERALD_FAULT_POLICY`: `treat_as_failed` or `abort` (default: treat_as_failed)
    /// - `HERALD_IGNORE_BOTS`: Ignore bot-authored messages (default: true)
    /// - `HERALD_LOG_LEVEL`: Fallback log filter (default: info)
    /// - `HERALD_LOG_JSON`: Emit JSON logs (default: false)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            event_capacity: std::env::var("HERALD_EVENT_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.event_capacity),
            fault_policy: std::env::var("HERALD_FAULT_POLICY")
                .ok()
                .and_then(|s| FaultPolicy::parse(&s))
                .unwrap_or(default.fault_policy),
            ignore_bots: std::env::var("HERALD_IGNORE_BOTS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.ignore_bots),
            log_level: std::env::var("HERALD_LOG_LEVEL").unwrap_or(default.log_level),
            log_json: std::env::var("HERALD_LOG_JSON")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.log_json),
        }
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the fault policy.
    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    /// Set whether bot-authored messages are ignored.
    pub fn with_ignore_bots(mut self, ignore_bots: bool) -> Self {
        self.ignore_bots = ignore_bots;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

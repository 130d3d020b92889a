//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence; otherwise the configured log level is used
//! as the filter.

use crate::config::DispatchConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Telemetry setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter could not be parsed
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter {
        /// Offending filter
        filter: String,
        /// Parser message
        message: String,
    },

    /// A global subscriber is already installed
    #[error("Tracing subscriber already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Build the log filter for `config`.
pub fn env_filter(config: &DispatchConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
            filter: config.log_level.clone(),
            message: e.to_string(),
        }),
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(config: &DispatchConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| TelemetryError::AlreadyInitialised(e.to_string()))?;

    tracing::info!(
        log_level = %config.log_level,
        json = config.log_json,
        "Tracing initialised"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = DispatchConfig {
            log_level: "herald=notalevel".to_string(),
            ..DispatchConfig::default()
        };
        assert!(matches!(env_filter(&config), Err(TelemetryError::InvalidFilter { .. })));
    }

    #[test]
    fn test_second_init_fails() {
        let config = DispatchConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(init_tracing(&config), Err(TelemetryError::AlreadyInitialised(_))));
    }
}

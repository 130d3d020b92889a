//! # Herald Commands
//!
//! Command matching, authorization and dispatch for Herald bots.
//!
//! ## Overview
//!
//! The herald-commands crate handles:
//! - **Definitions**: Command names, message matching rules, interaction schemas
//! - **Matching**: Exact and prefixed message matching, interaction sub-command paths
//! - **Registry**: Ordered registrations, first match wins
//! - **Authorization**: Per-invocation requirements through `herald-permissions`
//! - **Feedback**: Denial reporting through a pluggable sink
//! - **Execution**: A fresh command instance per invocation, panics contained
//!
//! ## Pipeline
//!
//! ```text
//! input ─→ matching ──(no match)──→ NoMatch
//!              │
//!              ▼
//!         authorizing ──(no permission)──→ feedback ─→ Rejected
//!              │
//!              ▼
//!          executing ──→ Completed | Failed
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use herald_commands::{
//!     init_tracing, CommandDefinition, CommandResult, DispatchConfig, Dispatcher, FeedbackType,
//!     FunctionCommand, MatchingSettings, MemoryFeedback,
//! };
//! use herald_context::MemoryLookup;
//! use herald_events::{ConnectionStatus, GatewayEvent};
//! use herald_permissions::{Requirement, RequirementSettings};
//! use std::sync::Arc;
//!
//! async fn run() {
//!     let config = DispatchConfig::from_env();
//!     config.validate().unwrap();
//!     init_tracing(&config).unwrap();
//!
//!     let dispatcher = Arc::new(Dispatcher::new(
//!         Arc::new(MemoryLookup::new()),
//!         Arc::new(MemoryFeedback::new()),
//!         config,
//!     ));
//!
//!     let ping = FunctionCommand::new(
//!         CommandDefinition::new("ping", "Pong!")
//!             .with_matching(MatchingSettings::prefixed("!", "ping"))
//!             .with_feedback(FeedbackType::Channel),
//!         |_ctx| Ok(CommandResult::success_with("pong")),
//!     );
//!     let settings = RequirementSettings::deny_by_default().with_requirement(Requirement::any_channel());
//!     dispatcher.register(Arc::new(ping), Some(Arc::new(settings))).await;
//!
//!     let (sender, event_loop) = dispatcher.intake().unwrap();
//!     let worker = tokio::spawn(event_loop.run());
//!     sender.send(GatewayEvent::status(ConnectionStatus::Connected)).await.unwrap();
//!
//!     drop(sender);
//!     worker.await.unwrap();
//! }
//! ```

pub mod command;
pub mod config;
pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod feedback;
pub mod matcher;
pub mod registry;
pub mod schema;
pub mod source;
pub mod stats;
pub mod telemetry;

// Re-export main types
pub use command::{
    Command, CommandArgs, CommandContext, CommandFactory, CommandResult, CommandStatus, FnCommandFactory,
    FunctionCommand,
};
pub use config::{ConfigError, DispatchConfig};
pub use definition::{CommandDefinition, FeedbackType};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{CommandError, ExecutionResult};
pub use feedback::{Denial, FeedbackError, FeedbackResult, FeedbackSink, MemoryFeedback, NoopFeedback};
pub use matcher::{MatchingSettings, MatchingType, DEFAULT_DELIMITER};
pub use registry::{CommandMatch, CommandRegistration, CommandRegistry};
pub use schema::{resolve_interaction, InteractionSchema, ResolvedInteraction, SchemaOption};
pub use source::{FnPermissionSource, PermissionSource, RequirementPass};
pub use stats::{DispatchMetrics, DispatchStats};
pub use telemetry::{env_filter, init_tracing, TelemetryError};

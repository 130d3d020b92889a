//! Commands and command factories
//!
//! A factory is registered once per logical command. Every dispatch asks it
//! for a fresh [`Command`] instance, so per-instance state never leaks
//! between concurrent invocations.

use crate::definition::CommandDefinition;
use crate::error::ExecutionResult;
use crate::schema::ResolvedInteraction;
use async_trait::async_trait;
use herald_context::InvocationContext;
use herald_permissions::PermissionResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Terminal status of a dispatch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// The command ran and reported success
    Success,
    /// The command was denied or failed
    Error,
}

impl CommandStatus {
    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Success => "success",
            CommandStatus::Error => "error",
        }
    }
}

/// Result reported by a command handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResult {
    /// Terminal status
    pub status: CommandStatus,

    /// Optional message for logging or the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult {
    /// A successful result with no message.
    pub fn success() -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
        }
    }

    /// A successful result with a message.
    pub fn success_with(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    /// An error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Error,
            message: Some(message.into()),
        }
    }

    /// Whether the status is success.
    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

/// Arguments extracted while matching.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArgs {
    /// Remaining text tokens of a message
    Text(Vec<String>),
    /// Resolved interaction options
    Interaction(ResolvedInteraction),
}

impl CommandArgs {
    /// Text tokens, if invoked by message.
    pub fn text(&self) -> Option<&[String]> {
        match self {
            CommandArgs::Text(tokens) => Some(tokens),
            CommandArgs::Interaction(_) => None,
        }
    }

    /// Resolved options, if invoked by interaction.
    pub fn interaction(&self) -> Option<&ResolvedInteraction> {
        match self {
            CommandArgs::Text(_) => None,
            CommandArgs::Interaction(resolved) => Some(resolved),
        }
    }
}

/// Everything a command sees when it runs.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// The invocation
    pub invocation: InvocationContext,

    /// Matched arguments
    pub args: CommandArgs,

    /// The permission decision that allowed execution
    pub permission: PermissionResult,
}

/// One command instance.
#[async_trait]
pub trait Command: Send {
    /// Run the command.
    async fn execute(&mut self, ctx: &CommandContext) -> ExecutionResult<CommandResult>;
}

/// Produces command instances.
pub trait CommandFactory: Send + Sync {
    /// The command's definition.
    fn definition(&self) -> &CommandDefinition;

    /// Create a fresh instance for one invocation.
    fn create(&self) -> Box<dyn Command>;
}

/// Factory wrapper around a constructor closure.
pub struct FnCommandFactory<F>
where
    F: Fn() -> Box<dyn Command> + Send + Sync,
{
    definition: CommandDefinition,
    constructor: F,
}

impl<F> FnCommandFactory<F>
where
    F: Fn() -> Box<dyn Command> + Send + Sync,
{
    /// Create a factory.
    pub fn new(definition: CommandDefinition, constructor: F) -> Self {
        Self {
            definition,
            constructor,
        }
    }
}

impl<F> CommandFactory for FnCommandFactory<F>
where
    F: Fn() -> Box<dyn Command> + Send + Sync,
{
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    fn create(&self) -> Box<dyn Command> {
        (self.constructor)()
    }
}

/// Simple stateless command backed by a function.
pub struct FunctionCommand<F>
where
    F: Fn(&CommandContext) -> ExecutionResult<CommandResult> + Send + Sync + 'static,
{
    definition: CommandDefinition,
    handler: Arc<F>,
}

impl<F> FunctionCommand<F>
where
    F: Fn(&CommandContext) -> ExecutionResult<CommandResult> + Send + Sync + 'static,
{
    /// Create a new function-based command.
    pub fn new(definition: CommandDefinition, handler: F) -> Self {
        Self {
            definition,
            handler: Arc::new(handler),
        }
    }
}

impl<F> CommandFactory for FunctionCommand<F>
where
    F: Fn(&CommandContext) -> ExecutionResult<CommandResult> + Send + Sync + 'static,
{
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    fn create(&self) -> Box<dyn Command> {
        Box::new(FunctionInstance {
            handler: self.handler.clone(),
        })
    }
}

struct FunctionInstance<F> {
    handler: Arc<F>,
}

#[async_trait]
impl<F> Command for FunctionInstance<F>
where
    F: Fn(&CommandContext) -> ExecutionResult<CommandResult> + Send + Sync + 'static,
{
    async fn execute(&mut self, ctx: &CommandContext) -> ExecutionResult<CommandResult> {
        (self.handler)(ctx)
    }
}

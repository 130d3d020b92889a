//! Dispatch pipeline
//!
//! Each input goes through three stages:
//!
//! 1. **Matching**: find the first registration that accepts the message or
//!    interaction. No match ends the dispatch silently.
//! 2. **Authorizing**: fetch the command's requirements for this invocation
//!    and resolve them. A denial is reported through the feedback sink
//!    according to the command's feedback type.
//! 3. **Executing**: create a fresh command instance and run it. Handler
//!    errors and panics become an error result; nothing is retried.

use crate::command::{CommandArgs, CommandContext, CommandFactory, CommandResult};
use crate::config::DispatchConfig;
use crate::error::{CommandError, ExecutionResult};
use crate::feedback::{Denial, FeedbackSink};
use crate::registry::{CommandMatch, CommandRegistration, CommandRegistry};
use crate::source::{PermissionSource, RequirementPass};
use crate::stats::{DispatchMetrics, DispatchStats};
use async_trait::async_trait;
use futures::FutureExt;
use herald_context::{Interaction, InvocationContext, Message, Payload, PlatformLookup};
use herald_events::{event_channel, EventError, EventHandler, EventLoop, EventResult, EventSender};
use herald_permissions::{PermissionResolver, PermissionResult, PermissionStatus};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// How a dispatch ended.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The author is a bot and bot messages are ignored
    Ignored,

    /// No registered command matched
    NoMatch,

    /// The invocation was denied
    Rejected {
        /// Command name
        command: String,
        /// The denying decision
        permission: PermissionResult,
        /// Error result reported to the caller
        result: CommandResult,
    },

    /// The command ran and returned a result
    Completed {
        /// Command name
        command: String,
        /// The allowing decision
        permission: PermissionResult,
        /// The handler's result
        result: CommandResult,
    },

    /// The command returned an error or panicked
    Failed {
        /// Command name
        command: String,
        /// The allowing decision
        permission: PermissionResult,
        /// Error result reported to the caller
        result: CommandResult,
    },
}

impl DispatchOutcome {
    /// Get the outcome name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Ignored => "ignored",
            DispatchOutcome::NoMatch => "no_match",
            DispatchOutcome::Rejected { .. } => "rejected",
            DispatchOutcome::Completed { .. } => "completed",
            DispatchOutcome::Failed { .. } => "failed",
        }
    }

    /// The terminal command result, if a command was matched.
    pub fn command_result(&self) -> Option<&CommandResult> {
        match self {
            DispatchOutcome::Ignored | DispatchOutcome::NoMatch => None,
            DispatchOutcome::Rejected { result, .. }
            | DispatchOutcome::Completed { result, .. }
            | DispatchOutcome::Failed { result, .. } => Some(result),
        }
    }

    /// The permission decision, if a command was matched.
    pub fn permission(&self) -> Option<&PermissionResult> {
        match self {
            DispatchOutcome::Ignored | DispatchOutcome::NoMatch => None,
            DispatchOutcome::Rejected { permission, .. }
            | DispatchOutcome::Completed { permission, .. }
            | DispatchOutcome::Failed { permission, .. } => Some(permission),
        }
    }

    /// The matched command's name.
    pub fn command(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Ignored | DispatchOutcome::NoMatch => None,
            DispatchOutcome::Rejected { command, .. }
            | DispatchOutcome::Completed { command, .. }
            | DispatchOutcome::Failed { command, .. } => Some(command),
        }
    }

    /// Whether a command ran and reported success.
    pub fn is_success(&self) -> bool {
        self.command_result().is_some_and(CommandResult::is_success)
    }
}

/// Matches, authorizes and runs commands.
///
/// # Example
///
/// ```rust,no_run
/// use herald_commands::{
///     CommandDefinition, CommandResult, DispatchConfig, Dispatcher, FunctionCommand, MatchingSettings,
///     NoopFeedback,
/// };
/// use herald_context::{MemoryLookup, Message, User};
/// use herald_permissions::{Requirement, RequirementSettings};
/// use std::sync::Arc;
///
/// async fn example() {
///     let dispatcher = Dispatcher::new(
///         Arc::new(MemoryLookup::new()),
///         Arc::new(NoopFeedback),
///         DispatchConfig::default(),
///     );
///
///     let ping = FunctionCommand::new(
///         CommandDefinition::new("ping", "Pong!").with_matching(MatchingSettings::prefixed("!", "ping")),
///         |_ctx| Ok(CommandResult::success_with("pong")),
///     );
///     let settings = RequirementSettings::deny_by_default().with_requirement(Requirement::any_channel());
///     dispatcher.register(Arc::new(ping), Some(Arc::new(settings))).await;
///
///     let outcome = dispatcher
///         .dispatch_message(Message::new("1", "!ping", User::new("42", "ferris"), "10"))
///         .await;
///     println!("{}", outcome.as_str());
/// }
/// ```
pub struct Dispatcher {
    registry: CommandRegistry,
    lookup: Arc<dyn PlatformLookup>,
    feedback: Arc<dyn FeedbackSink>,
    config: DispatchConfig,
    metrics: DispatchMetrics,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("stats", &self.metrics.snapshot())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher with an empty registry.
    pub fn new(lookup: Arc<dyn PlatformLookup>, feedback: Arc<dyn FeedbackSink>, config: DispatchConfig) -> Self {
        Self {
            registry: CommandRegistry::new(),
            lookup,
            feedback,
            config,
            metrics: DispatchMetrics::new(),
        }
    }

    /// Use an existing registry.
    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Current dispatch statistics.
    pub fn stats(&self) -> DispatchStats {
        self.metrics.snapshot()
    }

    fn resolver(&self) -> PermissionResolver<'_> {
        PermissionResolver::new(self.lookup.as_ref()).with_fault_policy(self.config.fault_policy)
    }

    /// Register a command.
    ///
    /// The permission source's registration-pass settings are resolved
    /// against an empty context; the outcome is stored as
    /// `enabled_by_default`.
    pub async fn register(
        &self,
        factory: Arc<dyn CommandFactory>,
        permissions: Option<Arc<dyn PermissionSource>>,
    ) -> Arc<CommandRegistration> {
        let enabled_by_default = match &permissions {
            None => true,
            Some(source) => {
                let settings = source.requirements(RequirementPass::Registration).await;
                match self.resolver().resolve(settings.as_ref(), &InvocationContext::none()).await {
                    Ok(result) => result.is_allowed(),
                    Err(e) => {
                        tracing::warn!(
                            command = %factory.definition().name,
                            error = %e,
                            "Registration permission check faulted, disabling by default"
                        );
                        false
                    }
                }
            }
        };

        tracing::info!(
            command = %factory.definition().name,
            restricted = permissions.is_some(),
            enabled_by_default,
            "Command registered"
        );

        self.registry
            .insert(CommandRegistration {
                factory,
                permissions,
                enabled_by_default,
            })
            .await
    }

    /// Dispatch a message.
    pub async fn dispatch_message(&self, message: Message) -> DispatchOutcome {
        self.dispatch(InvocationContext::from_message(message)).await
    }

    /// Dispatch an interaction.
    pub async fn dispatch_interaction(&self, interaction: Interaction) -> DispatchOutcome {
        self.dispatch(InvocationContext::from_interaction(interaction)).await
    }

    /// Run one invocation through matching, authorization and execution.
    pub async fn dispatch(&self, ctx: InvocationContext) -> DispatchOutcome {
        self.metrics.record_received();

        if self.config.ignore_bots && ctx.message().is_some_and(|message| message.author.bot) {
            self.metrics.record_ignored();
            tracing::trace!(invocation_id = %ctx.id, "Ignoring bot message");
            return DispatchOutcome::Ignored;
        }

        let matched = match &ctx.payload {
            Payload::Message(message) => self.registry.match_message(message).await,
            Payload::Interaction(interaction) => self.registry.match_interaction(interaction).await,
            Payload::None => None,
        };

        let Some(CommandMatch { registration, args }) = matched else {
            self.metrics.record_unmatched();
            tracing::trace!(invocation_id = %ctx.id, modality = ctx.modality().as_str(), "No command matched");
            return DispatchOutcome::NoMatch;
        };

        let command = registration.name().to_string();
        let permission = match self.authorize(&registration, &ctx).await {
            Ok(permission) if permission.is_allowed() => permission,
            Ok(permission) => {
                let reason = CommandError::PermissionDenied(command.clone());
                return self.reject(&registration, command, ctx, permission, reason).await;
            }
            Err(e) => {
                tracing::error!(
                    invocation_id = %ctx.id,
                    command = %command,
                    error_code = e.error_code(),
                    error = %e,
                    "Permission resolution aborted, denying"
                );
                let permission = PermissionResult::new(PermissionStatus::NoPermission);
                return self.reject(&registration, command, ctx, permission, e).await;
            }
        };

        self.execute(&registration, command, ctx, args, permission).await
    }

    async fn authorize(
        &self,
        registration: &CommandRegistration,
        ctx: &InvocationContext,
    ) -> ExecutionResult<PermissionResult> {
        let settings = match &registration.permissions {
            Some(source) => source.requirements(RequirementPass::Invocation(ctx)).await,
            None => None,
        };

        Ok(self.resolver().resolve(settings.as_ref(), ctx).await?)
    }

    async fn reject(
        &self,
        registration: &CommandRegistration,
        command: String,
        ctx: InvocationContext,
        permission: PermissionResult,
        reason: CommandError,
    ) -> DispatchOutcome {
        self.metrics.record_rejected();
        let feedback = registration.definition().feedback;

        tracing::info!(
            invocation_id = %ctx.id,
            command = %command,
            failed_requirements = permission.failed_requirements.len(),
            feedback = feedback.as_str(),
            "Command rejected"
        );

        if !feedback.is_silent() {
            let denial = Denial::new(command.clone(), feedback, ctx, permission.clone());
            if let Err(e) = self.feedback.deliver(&denial).await {
                self.metrics.record_feedback_failure();
                tracing::warn!(command = %command, error = %e, "Failed to deliver denial feedback");
            }
        }

        let result = CommandResult::error(reason.to_string());
        DispatchOutcome::Rejected {
            command,
            permission,
            result,
        }
    }

    async fn execute(
        &self,
        registration: &CommandRegistration,
        command: String,
        invocation: InvocationContext,
        args: CommandArgs,
        permission: PermissionResult,
    ) -> DispatchOutcome {
        let invocation_id = invocation.id;
        let context = CommandContext {
            invocation,
            args,
            permission,
        };

        let mut instance = registration.factory.create();
        let run = AssertUnwindSafe(instance.execute(&context)).catch_unwind().await;
        let permission = context.permission;

        let error = match run {
            Ok(Ok(result)) => {
                self.metrics.record_completed();
                tracing::info!(
                    invocation_id = %invocation_id,
                    command = %command,
                    status = result.status.as_str(),
                    "Command completed"
                );
                return DispatchOutcome::Completed {
                    command,
                    permission,
                    result,
                };
            }
            Ok(Err(e)) => e,
            Err(payload) => CommandError::Panicked(panic_message(payload)),
        };

        self.metrics.record_failed();
        if error.is_server_error() {
            tracing::error!(
                invocation_id = %invocation_id,
                command = %command,
                error_code = error.error_code(),
                error = %error,
                "Command failed"
            );
        } else {
            tracing::warn!(
                invocation_id = %invocation_id,
                command = %command,
                error_code = error.error_code(),
                error = %error,
                "Command failed"
            );
        }

        DispatchOutcome::Failed {
            command,
            permission,
            result: CommandResult::error(error.to_string()),
        }
    }

    /// Create the event intake for this dispatcher.
    ///
    /// The channel capacity comes from the configuration. Run the returned
    /// loop to start dispatching.
    pub fn intake(self: &Arc<Self>) -> EventResult<(EventSender, EventLoop)> {
        let (sender, receiver) = event_channel(self.config.event_capacity)?;
        let handler: Arc<dyn EventHandler> = self.clone();
        Ok((sender, EventLoop::new(receiver, handler)))
    }
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn handle(&self, ctx: InvocationContext) -> EventResult<()> {
        match self.dispatch(ctx).await {
            DispatchOutcome::Failed { command, result, .. } => Err(EventError::HandlerError(format!(
                "{}: {}",
                command,
                result.message.unwrap_or_default()
            ))),
            _ => Ok(()),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandStatus, FnCommandFactory, FunctionCommand};
    use crate::definition::{CommandDefinition, FeedbackType};
    use crate::feedback::{FeedbackError, FeedbackResult, MemoryFeedback};
    use crate::matcher::MatchingSettings;
    use crate::source::FnPermissionSource;
    use herald_context::{Channel, MemoryLookup, User};
    use herald_permissions::{CheckError, FaultPolicy, Requirement, RequirementSettings};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn lookup() -> Arc<MemoryLookup> {
        let lookup = MemoryLookup::new();
        lookup.add_channel(Channel::text("10", "general", "1")).await;
        Arc::new(lookup)
    }

    fn echo(feedback: FeedbackType) -> Arc<dyn CommandFactory> {
        Arc::new(FunctionCommand::new(
            CommandDefinition::new("echo", "Echo arguments")
                .with_matching(MatchingSettings::prefixed("!", "echo"))
                .with_feedback(feedback),
            |ctx| {
                let words = ctx.args.text().unwrap_or_default();
                Ok(CommandResult::success_with(words.join(" ")))
            },
        ))
    }

    fn message(content: &str) -> Message {
        Message::new("m1", content, User::new("42", "ferris"), "10")
    }

    #[tokio::test]
    async fn test_completed_with_arguments() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        dispatcher.register(echo(FeedbackType::Silent), None).await;

        let outcome = dispatcher.dispatch_message(message("!echo hello  world")).await;
        assert_eq!(outcome.as_str(), "completed");
        assert_eq!(outcome.command(), Some("echo"));
        assert_eq!(outcome.command_result().unwrap().message.as_deref(), Some("hello world"));
        assert!(outcome.permission().unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_no_match_is_silent() {
        let feedback = Arc::new(MemoryFeedback::new());
        let dispatcher = Dispatcher::new(lookup().await, feedback.clone(), DispatchConfig::default());
        dispatcher.register(echo(FeedbackType::Channel), None).await;

        let outcome = dispatcher.dispatch_message(message("hello there")).await;
        assert!(matches!(outcome, DispatchOutcome::NoMatch));
        assert!(outcome.command_result().is_none());
        assert!(feedback.is_empty().await);
        assert_eq!(dispatcher.stats().unmatched, 1);

        let none = dispatcher.dispatch(InvocationContext::none()).await;
        assert!(matches!(none, DispatchOutcome::NoMatch));
    }

    #[tokio::test]
    async fn test_bot_messages_ignored() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        dispatcher.register(echo(FeedbackType::Silent), None).await;

        let bot = Message::new("m1", "!echo hi", User::new("99", "otherbot").as_bot(), "10");
        assert!(matches!(dispatcher.dispatch_message(bot.clone()).await, DispatchOutcome::Ignored));

        let permissive = Dispatcher::new(
            lookup().await,
            Arc::new(MemoryFeedback::new()),
            DispatchConfig::default().with_ignore_bots(false),
        );
        permissive.register(echo(FeedbackType::Silent), None).await;
        assert!(permissive.dispatch_message(bot).await.is_success());
    }

    #[tokio::test]
    async fn test_rejected_delivers_feedback_unless_silent() {
        let feedback = Arc::new(MemoryFeedback::new());
        let dispatcher = Dispatcher::new(lookup().await, feedback.clone(), DispatchConfig::default());
        let deny: Arc<dyn PermissionSource> = Arc::new(RequirementSettings::deny_by_default());

        dispatcher.register(echo(FeedbackType::DirectMessage), Some(deny.clone())).await;
        let outcome = dispatcher.dispatch_message(message("!echo hi")).await;
        assert_eq!(outcome.as_str(), "rejected");
        assert_eq!(outcome.command_result().unwrap().status, CommandStatus::Error);

        let denials = feedback.denials().await;
        assert_eq!(denials.len(), 1);
        assert_eq!(denials[0].command, "echo");
        assert_eq!(denials[0].feedback, FeedbackType::DirectMessage);

        let silent_feedback = Arc::new(MemoryFeedback::new());
        let silent = Dispatcher::new(lookup().await, silent_feedback.clone(), DispatchConfig::default());
        silent.register(echo(FeedbackType::Silent), Some(deny)).await;
        assert_eq!(silent.dispatch_message(message("!echo hi")).await.as_str(), "rejected");
        assert!(silent_feedback.is_empty().await);
    }

    struct BrokenFeedback;

    #[async_trait]
    impl FeedbackSink for BrokenFeedback {
        async fn deliver(&self, _denial: &Denial) -> FeedbackResult<()> {
            Err(FeedbackError::DeliveryFailed("cannot DM user".into()))
        }
    }

    #[tokio::test]
    async fn test_feedback_failure_does_not_change_outcome() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(BrokenFeedback), DispatchConfig::default());
        dispatcher
            .register(echo(FeedbackType::DirectMessage), Some(Arc::new(RequirementSettings::deny_by_default())))
            .await;

        let outcome = dispatcher.dispatch_message(message("!echo hi")).await;
        assert_eq!(outcome.as_str(), "rejected");
        assert_eq!(dispatcher.stats().feedback_failures, 1);
    }

    #[tokio::test]
    async fn test_handler_error_and_panic_become_failed() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        dispatcher
            .register(
                Arc::new(FunctionCommand::new(
                    CommandDefinition::new("fail", "Always fails").with_matching(MatchingSettings::exact("fail")),
                    |_ctx| Err(CommandError::execution("database offline")),
                )),
                None,
            )
            .await;
        dispatcher
            .register(
                Arc::new(FunctionCommand::new(
                    CommandDefinition::new("panic", "Always panics").with_matching(MatchingSettings::exact("panic")),
                    |_ctx| panic!("handler exploded"),
                )),
                None,
            )
            .await;

        let failed = dispatcher.dispatch_message(message("fail")).await;
        assert_eq!(failed.as_str(), "failed");
        assert!(failed.command_result().unwrap().message.as_deref().unwrap().contains("database offline"));

        let panicked = dispatcher.dispatch_message(message("panic")).await;
        assert_eq!(panicked.as_str(), "failed");
        assert!(panicked.command_result().unwrap().message.as_deref().unwrap().contains("handler exploded"));

        let stats = dispatcher.stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.completed, 0);
    }

    #[tokio::test]
    async fn test_error_status_result_is_completed() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        dispatcher
            .register(
                Arc::new(FunctionCommand::new(
                    CommandDefinition::new("roll", "Roll dice").with_matching(MatchingSettings::prefixed("!", "roll")),
                    |_ctx| Ok(CommandResult::error("no dice given")),
                )),
                None,
            )
            .await;

        let outcome = dispatcher.dispatch_message(message("!roll")).await;
        assert_eq!(outcome.as_str(), "completed");
        assert!(!outcome.is_success());
    }

    struct Counted {
        calls: u32,
    }

    #[async_trait]
    impl Command for Counted {
        async fn execute(&mut self, _ctx: &CommandContext) -> ExecutionResult<CommandResult> {
            self.calls += 1;
            Ok(CommandResult::success_with(self.calls.to_string()))
        }
    }

    #[tokio::test]
    async fn test_fresh_instance_per_dispatch() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory = FnCommandFactory::new(
            CommandDefinition::new("count", "Count").with_matching(MatchingSettings::exact("count")),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::new(Counted { calls: 0 }) as Box<dyn Command>
            },
        );

        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        dispatcher.register(Arc::new(factory), None).await;

        for _ in 0..3 {
            let outcome = dispatcher.dispatch_message(message("count")).await;
            assert_eq!(outcome.command_result().unwrap().message.as_deref(), Some("1"));
        }
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_registration_pass_sets_default_enablement() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());

        let open = dispatcher.register(echo(FeedbackType::Silent), None).await;
        assert!(open.enabled_by_default);

        let channel_only = dispatcher
            .register(
                echo(FeedbackType::Silent),
                Some(Arc::new(RequirementSettings::deny_by_default().with_requirement(Requirement::any_channel()))),
            )
            .await;
        assert!(!channel_only.enabled_by_default);

        let seen_registration = Arc::new(AtomicUsize::new(0));
        let seen = seen_registration.clone();
        let source = FnPermissionSource::new(move |pass: RequirementPass<'_>| {
            if pass.is_registration() {
                seen.fetch_add(1, Ordering::SeqCst);
                Some(RequirementSettings::allow_by_default())
            } else {
                Some(RequirementSettings::deny_by_default())
            }
        });
        let dynamic = dispatcher.register(echo(FeedbackType::Silent), Some(Arc::new(source))).await;
        assert!(dynamic.enabled_by_default);
        assert_eq!(seen_registration.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invocation_pass_requirements_apply() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        let source = FnPermissionSource::new(|pass: RequirementPass<'_>| match pass {
            RequirementPass::Registration => Some(RequirementSettings::allow_by_default()),
            RequirementPass::Invocation(ctx) => {
                let author = ctx.user().map(|u| u.id.clone()).unwrap_or_default();
                Some(RequirementSettings::deny_by_default().with_requirement(Requirement::user(author)))
            }
        });
        dispatcher.register(echo(FeedbackType::Silent), Some(Arc::new(source))).await;

        assert!(dispatcher.dispatch_message(message("!echo")).await.is_success());
    }

    #[tokio::test]
    async fn test_abort_policy_rejects() {
        let config = DispatchConfig::default().with_fault_policy(FaultPolicy::Abort);
        let feedback = Arc::new(MemoryFeedback::new());
        let dispatcher = Dispatcher::new(lookup().await, feedback.clone(), config);

        let faulty = RequirementSettings::allow_by_default().with_requirement(Requirement::custom_fn(
            "flaky-backend",
            |_ctx, _req| Box::pin(async { Err::<bool, _>(CheckError::from("timeout")) }),
        ));
        dispatcher.register(echo(FeedbackType::Channel), Some(Arc::new(faulty))).await;

        let outcome = dispatcher.dispatch_message(message("!echo")).await;
        assert_eq!(outcome.as_str(), "rejected");
        let reason = outcome.command_result().unwrap().message.as_deref().unwrap();
        assert!(reason.starts_with("Permission check aborted"));
        assert!(reason.contains("timeout"));
        assert_eq!(feedback.len().await, 1);
    }

    fn explosive() -> Requirement {
        Requirement::custom_fn("explosive", |ctx, _req| {
            Box::pin(async move {
                if ctx.user().is_some() {
                    panic!("predicate blew up");
                }
                Ok::<_, CheckError>(true)
            })
        })
    }

    #[tokio::test]
    async fn test_panicking_check_counts_as_failed() {
        let feedback = Arc::new(MemoryFeedback::new());
        let dispatcher = Dispatcher::new(lookup().await, feedback.clone(), DispatchConfig::default());
        let settings = RequirementSettings::deny_by_default().with_requirement(explosive());
        let registration = dispatcher
            .register(echo(FeedbackType::Channel), Some(Arc::new(settings)))
            .await;
        assert!(registration.enabled_by_default);

        let outcome = dispatcher.dispatch_message(message("!echo hi")).await;
        assert_eq!(outcome.as_str(), "rejected");
        let permission = outcome.permission().unwrap();
        assert_eq!(permission.failed_requirements.len(), 1);
        assert_eq!(permission.faults.len(), 1);
        assert!(permission.faults[0].message.contains("predicate blew up"));
        assert_eq!(feedback.len().await, 1);

        let lenient = RequirementSettings::allow_by_default().with_requirement(explosive());
        let open = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        open.register(echo(FeedbackType::Silent), Some(Arc::new(lenient))).await;
        assert!(open.dispatch_message(message("!echo hi")).await.is_success());
    }

    #[tokio::test]
    async fn test_panicking_check_at_registration_disables() {
        let dispatcher = Dispatcher::new(lookup().await, Arc::new(MemoryFeedback::new()), DispatchConfig::default());
        let always = Requirement::custom_fn("always-explodes", |_ctx, req| {
            Box::pin(async move {
                if req.identifier() == "always-explodes" {
                    panic!("registration blew up");
                }
                Ok::<_, CheckError>(true)
            })
        });
        let registration = dispatcher
            .register(
                echo(FeedbackType::Silent),
                Some(Arc::new(RequirementSettings::deny_by_default().with_requirement(always))),
            )
            .await;
        assert!(!registration.enabled_by_default);
    }

    #[tokio::test]
    async fn test_dispatcher_as_event_handler() {
        let dispatcher = Arc::new(Dispatcher::new(
            lookup().await,
            Arc::new(MemoryFeedback::new()),
            DispatchConfig::default().with_event_capacity(4),
        ));
        dispatcher.register(echo(FeedbackType::Silent), None).await;

        let (sender, event_loop) = dispatcher.intake().unwrap();
        sender.send(herald_events::GatewayEvent::message(message("!echo a"))).await.unwrap();
        sender.send(herald_events::GatewayEvent::message(message("unrelated"))).await.unwrap();
        drop(sender);

        let loop_stats = event_loop.run().await;
        assert_eq!(loop_stats.events_dispatched, 2);
        assert_eq!(loop_stats.handler_errors, 0);

        let stats = dispatcher.stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.unmatched, 1);
    }
}

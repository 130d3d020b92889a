//! # Requirements
//!
//! A requirement is one rule in a command's authorization policy: a typed
//! test against the invocation context, an effect to apply when the test
//! passes, an effect to apply when it fails, and a priority.
//!
//! Requirement kinds:
//! - **User**: the acting user's ID or username
//! - **Role**: a role the acting member holds (ID or name)
//! - **Guild**: the current guild (ID or name)
//! - **Channel**: the current text channel (ID or name)
//! - **AnyChannel**: any text channel
//! - **PlatformPermission**: platform permission bits the member must hold
//! - **Custom**: a caller-supplied asynchronous check

use async_trait::async_trait;
use futures::future::BoxFuture;
use herald_context::InvocationContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::CheckError;
use crate::result::PermissionStatus;

/// Priority reported for requirements without an explicit one.
pub const DEFAULT_PRIORITY: i32 = 1;

/// What a requirement does to the running decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Decision becomes has-permission
    Grant,
    /// Decision becomes no-permission
    Revoke,
    /// Decision is left unchanged
    #[default]
    None,
}

impl Effect {
    /// Apply this effect to a running status.
    ///
    /// # Example
    ///
    /// ```
    /// use herald_permissions::{Effect, PermissionStatus};
    ///
    /// assert_eq!(Effect::Grant.apply(PermissionStatus::NoPermission), PermissionStatus::HasPermission);
    /// assert_eq!(Effect::None.apply(PermissionStatus::NoPermission), PermissionStatus::NoPermission);
    /// ```
    pub fn apply(self, status: PermissionStatus) -> PermissionStatus {
        match self {
            Effect::Grant => PermissionStatus::HasPermission,
            Effect::Revoke => PermissionStatus::NoPermission,
            Effect::None => status,
        }
    }

    /// Get the string representation of the effect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Grant => "grant",
            Effect::Revoke => "revoke",
            Effect::None => "none",
        }
    }

    /// Parse an effect from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grant" | "allow" => Some(Effect::Grant),
            "revoke" | "deny" => Some(Effect::Revoke),
            "none" | "" => Some(Effect::None),
            _ => None,
        }
    }
}

/// Future returned by function-based custom checks.
pub type CheckFuture<'a> = BoxFuture<'a, Result<bool, CheckError>>;

/// A caller-supplied asynchronous requirement check.
#[async_trait]
pub trait CustomCheck: Send + Sync {
    /// Decide whether the requirement passes for this invocation.
    async fn check(&self, ctx: &InvocationContext, requirement: &Requirement) -> Result<bool, CheckError>;
}

/// Adapter turning a closure into a [`CustomCheck`].
pub struct FnCheck<F> {
    f: F,
}

#[async_trait]
impl<F> CustomCheck for FnCheck<F>
where
    F: for<'a> Fn(&'a InvocationContext, &'a Requirement) -> CheckFuture<'a> + Send + Sync,
{
    async fn check(&self, ctx: &InvocationContext, requirement: &Requirement) -> Result<bool, CheckError> {
        (self.f)(ctx, requirement).await
    }
}

/// A labelled custom check, shared between clones of its requirement.
#[derive(Clone)]
pub struct CustomPredicate {
    label: String,
    check: Arc<dyn CustomCheck>,
}

impl CustomPredicate {
    /// The label identifying this check in logs and diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the check.
    pub async fn check(&self, ctx: &InvocationContext, requirement: &Requirement) -> Result<bool, CheckError> {
        self.check.check(ctx, requirement).await
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate").field("label", &self.label).finish()
    }
}

/// The typed test a requirement performs, with its identifier.
#[derive(Debug, Clone)]
pub enum RequirementKind {
    /// Acting user's ID or username
    User(String),
    /// Held role ID or name
    Role(String),
    /// Current guild ID or name
    Guild(String),
    /// Current text channel ID or name
    Channel(String),
    /// Any text channel
    AnyChannel,
    /// Permission name, comma-separated names, or raw bitmask
    PlatformPermission(String),
    /// Caller-supplied check
    Custom(CustomPredicate),
}

impl RequirementKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::User(_) => "user",
            RequirementKind::Role(_) => "role",
            RequirementKind::Guild(_) => "guild",
            RequirementKind::Channel(_) => "channel",
            RequirementKind::AnyChannel => "any_channel",
            RequirementKind::PlatformPermission(_) => "platform_permission",
            RequirementKind::Custom(_) => "custom",
        }
    }

    /// The kind's identifier; empty for [`RequirementKind::AnyChannel`], the label for custom checks.
    pub fn identifier(&self) -> &str {
        match self {
            RequirementKind::User(id)
            | RequirementKind::Role(id)
            | RequirementKind::Guild(id)
            | RequirementKind::Channel(id)
            | RequirementKind::PlatformPermission(id) => id,
            RequirementKind::AnyChannel => "",
            RequirementKind::Custom(predicate) => predicate.label(),
        }
    }
}

/// A single authorization rule.
///
/// By default a requirement grants on success and leaves the decision
/// unchanged on failure, and has no explicit priority.
///
/// # Example
///
/// ```
/// use herald_permissions::{Effect, Requirement};
///
/// let mods = Requirement::role("Moderator");
/// assert_eq!(mods.on_success, Effect::Grant);
/// assert_eq!(mods.on_failure, Effect::None);
///
/// let no_bots_channel = Requirement::channel("bot-free")
///     .on_success(Effect::Revoke)
///     .on_failure(Effect::None)
///     .with_priority(10);
/// assert_eq!(no_bots_channel.to_string(), "channel:bot-free");
/// assert_eq!(no_bots_channel.effective_priority(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct Requirement {
    /// The test to perform
    pub kind: RequirementKind,

    /// Effect applied when the test passes
    pub on_success: Effect,

    /// Effect applied when the test fails
    pub on_failure: Effect,

    /// Explicit priority; `None` sorts below every explicit value
    pub priority: Option<i32>,
}

impl Requirement {
    /// Create a requirement of the given kind with default effects.
    pub fn new(kind: RequirementKind) -> Self {
        Self {
            kind,
            on_success: Effect::Grant,
            on_failure: Effect::None,
            priority: None,
        }
    }

    /// Require a specific user (ID or username).
    pub fn user(identifier: impl Into<String>) -> Self {
        Self::new(RequirementKind::User(identifier.into()))
    }

    /// Require a held role (ID or name).
    pub fn role(identifier: impl Into<String>) -> Self {
        Self::new(RequirementKind::Role(identifier.into()))
    }

    /// Require a specific guild (ID or name).
    pub fn guild(identifier: impl Into<String>) -> Self {
        Self::new(RequirementKind::Guild(identifier.into()))
    }

    /// Require a specific text channel (ID or name).
    pub fn channel(identifier: impl Into<String>) -> Self {
        Self::new(RequirementKind::Channel(identifier.into()))
    }

    /// Require any text channel.
    pub fn any_channel() -> Self {
        Self::new(RequirementKind::AnyChannel)
    }

    /// Require platform permissions (name, comma-separated names, or raw bitmask).
    pub fn permission(identifier: impl Into<String>) -> Self {
        Self::new(RequirementKind::PlatformPermission(identifier.into()))
    }

    /// Require a custom check to pass.
    pub fn custom(label: impl Into<String>, check: impl CustomCheck + 'static) -> Self {
        Self::new(RequirementKind::Custom(CustomPredicate {
            label: label.into(),
            check: Arc::new(check),
        }))
    }

    /// Require a closure-based custom check to pass.
    ///
    /// # Example
    ///
    /// ```
    /// use herald_permissions::{CheckError, Requirement};
    ///
    /// let weekdays_only = Requirement::custom_fn("weekdays", |_ctx, _requirement| {
    ///     Box::pin(async move { Ok::<_, CheckError>(true) })
    /// });
    /// assert!(weekdays_only.is_custom());
    /// ```
    pub fn custom_fn<F>(label: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a InvocationContext, &'a Requirement) -> CheckFuture<'a> + Send + Sync + 'static,
    {
        Self::custom(label, FnCheck { f })
    }

    /// Set the effect applied when the test passes.
    pub fn on_success(mut self, effect: Effect) -> Self {
        self.on_success = effect;
        self
    }

    /// Set the effect applied when the test fails.
    pub fn on_failure(mut self, effect: Effect) -> Self {
        self.on_failure = effect;
        self
    }

    /// Set an explicit priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// The requirement's identifier.
    pub fn identifier(&self) -> &str {
        self.kind.identifier()
    }

    /// Explicit priority, or [`DEFAULT_PRIORITY`].
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    /// Whether this is a custom requirement.
    pub fn is_custom(&self) -> bool {
        matches!(self.kind, RequirementKind::Custom(_))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RequirementKind::AnyChannel => f.write_str(self.kind.as_str()),
            kind => write!(f, "{}:{}", kind.as_str(), kind.identifier()),
        }
    }
}

//! Permission sources
//!
//! A command's requirements are fetched from a source on two occasions: once
//! at registration to decide default enablement, and on every invocation.
//! Static settings return the same requirements for both.

use async_trait::async_trait;
use herald_context::InvocationContext;
use herald_permissions::RequirementSettings;

/// Occasion on which requirements are requested.
#[derive(Debug, Clone, Copy)]
pub enum RequirementPass<'a> {
    /// Initial registration, with no live invocation
    Registration,
    /// A live invocation
    Invocation(&'a InvocationContext),
}

impl RequirementPass<'_> {
    /// Whether this is the registration pass.
    pub fn is_registration(&self) -> bool {
        matches!(self, RequirementPass::Registration)
    }
}

/// Supplies a command's requirement settings.
///
/// Returning `None` leaves the command unrestricted.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Requirements for the given pass.
    async fn requirements(&self, pass: RequirementPass<'_>) -> Option<RequirementSettings>;
}

#[async_trait]
impl PermissionSource for RequirementSettings {
    async fn requirements(&self, _pass: RequirementPass<'_>) -> Option<RequirementSettings> {
        Some(self.clone())
    }
}

/// Source backed by a closure, for requirements that depend on the pass.
///
/// # Example
///
/// ```
/// use herald_commands::{FnPermissionSource, RequirementPass};
/// use herald_permissions::{Requirement, RequirementSettings};
///
/// // Hidden from the platform's default command list, open once invoked.
/// let source = FnPermissionSource::new(|pass: RequirementPass<'_>| {
///     if pass.is_registration() {
///         Some(RequirementSettings::deny_by_default())
///     } else {
///         Some(RequirementSettings::deny_by_default().with_requirement(Requirement::any_channel()))
///     }
/// });
/// ```
pub struct FnPermissionSource<F>
where
    F: Fn(RequirementPass<'_>) -> Option<RequirementSettings> + Send + Sync,
{
    build: F,
}

impl<F> FnPermissionSource<F>
where
    F: Fn(RequirementPass<'_>) -> Option<RequirementSettings> + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(build: F) -> Self {
        Self { build }
    }
}

#[async_trait]
impl<F> PermissionSource for FnPermissionSource<F>
where
    F: Fn(RequirementPass<'_>) -> Option<RequirementSettings> + Send + Sync,
{
    async fn requirements(&self, pass: RequirementPass<'_>) -> Option<RequirementSettings> {
        (self.build)(pass)
    }
}

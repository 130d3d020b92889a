//! Permission resolution logic.
//!
//! Folds a command's requirements into one decision for an invocation.
//!
//! Resolution order:
//! 1. No settings at all means the command is unrestricted
//! 2. Start from the settings' default decision
//! 3. Evaluate requirements in priority order (see [`evaluation_order`])
//! 4. Each result applies its requirement's success or failure effect,
//!    overwriting the running decision
//!
//! Requirements are evaluated strictly one after another; a later requirement
//! is never started before the previous one's effect has been applied.

use herald_context::{InvocationContext, PlatformLookup};
use serde::{Deserialize, Serialize};

use crate::error::{PermissionError, ResolveResult};
use crate::evaluator::RequirementEvaluator;
use crate::result::{PermissionResult, PermissionStatus, RequirementFault};
use crate::settings::RequirementSettings;
use crate::sorter::evaluation_order;

/// What to do when a requirement cannot be evaluated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Count the faulted requirement as failed and continue
    #[default]
    TreatAsFailed,
    /// Stop resolving and return the fault
    Abort,
}

impl FaultPolicy {
    /// Get the string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultPolicy::TreatAsFailed => "treat_as_failed",
            FaultPolicy::Abort => "abort",
        }
    }

    /// Parse a policy from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "treat_as_failed" | "fail" | "failed" => Some(FaultPolicy::TreatAsFailed),
            "abort" => Some(FaultPolicy::Abort),
            _ => None,
        }
    }
}

/// Resolves requirement settings into a [`PermissionResult`].
///
/// # Example
///
/// ```
/// use herald_context::{InvocationContext, MemoryLookup};
/// use herald_permissions::{PermissionResolver, PermissionStatus, RequirementSettings};
///
/// async fn example() {
///     let lookup = MemoryLookup::new();
///     let resolver = PermissionResolver::new(&lookup);
///     let ctx = InvocationContext::none();
///
///     let result = resolver.resolve(None, &ctx).await.unwrap();
///     assert_eq!(result.status, PermissionStatus::HasPermission);
///
///     let settings = RequirementSettings::deny_by_default();
///     let result = resolver.resolve(Some(&settings), &ctx).await.unwrap();
///     assert_eq!(result.status, PermissionStatus::NoPermission);
/// }
/// ```
#[derive(Clone, Copy)]
pub struct PermissionResolver<'a> {
    evaluator: RequirementEvaluator<'a>,
    fault_policy: FaultPolicy,
}

impl<'a> PermissionResolver<'a> {
    /// Create a resolver with the default fault policy.
    pub fn new(lookup: &'a dyn PlatformLookup) -> Self {
        Self {
            evaluator: RequirementEvaluator::new(lookup),
            fault_policy: FaultPolicy::default(),
        }
    }

    /// Set the fault policy.
    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    /// The active fault policy.
    pub fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    /// Resolve `settings` for one invocation.
    ///
    /// Returns `Err` only under [`FaultPolicy::Abort`] when a requirement
    /// faults.
    pub async fn resolve(
        &self,
        settings: Option<&RequirementSettings>,
        ctx: &InvocationContext,
    ) -> ResolveResult<PermissionResult> {
        let Some(settings) = settings else {
            return Ok(PermissionResult::unrestricted());
        };

        let mut result = PermissionResult::new(PermissionStatus::from_default_allow(settings.default_allow));

        for requirement in evaluation_order(&settings.requirements) {
            let passed = match self.evaluator.test(ctx, requirement).await {
                Ok(passed) => passed,
                Err(error) => match self.fault_policy {
                    FaultPolicy::Abort => {
                        tracing::error!(
                            invocation_id = %ctx.id,
                            requirement = %requirement,
                            error = %error,
                            "Requirement evaluation faulted, aborting resolution"
                        );
                        return Err(PermissionError::Evaluation {
                            requirement: requirement.to_string(),
                            source: error,
                        });
                    }
                    FaultPolicy::TreatAsFailed => {
                        tracing::warn!(
                            invocation_id = %ctx.id,
                            requirement = %requirement,
                            error_code = error.error_code(),
                            error = %error,
                            "Requirement evaluation faulted, counting as failed"
                        );
                        result.faults.push(RequirementFault {
                            requirement: requirement.clone(),
                            message: error.to_string(),
                        });
                        false
                    }
                },
            };

            let effect = if passed {
                requirement.on_success
            } else {
                result.failed_requirements.push(requirement.clone());
                requirement.on_failure
            };
            result.status = effect.apply(result.status);

            tracing::trace!(
                invocation_id = %ctx.id,
                requirement = %requirement,
                passed,
                effect = effect.as_str(),
                status = result.status.as_str(),
                "Requirement evaluated"
            );
        }

        tracing::debug!(
            invocation_id = %ctx.id,
            status = result.status.as_str(),
            failed = result.failed_requirements.len(),
            faults = result.faults.len(),
            "Permissions resolved"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CheckError, EvaluationError};
    use crate::requirement::{Effect, Requirement};
    use herald_context::{Channel, Guild, LookupError, LookupResult, MemoryLookup, Member, Message, Role, User};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn lookup() -> MemoryLookup {
        let lookup = MemoryLookup::new();
        lookup.add_guild(Guild::new("1", "Rustaceans")).await;
        lookup.add_channel(Channel::text("10", "general", "1")).await;
        lookup.add_role("1", Role::new("100", "Moderator")).await;
        lookup
    }

    fn ctx_with_roles(roles: &[&str]) -> InvocationContext {
        let user = User::new("42", "ferris");
        let member = Member::new(user.clone()).with_roles(roles.iter().copied());
        InvocationContext::from_message(Message::new("m1", "!cmd", user, "10").in_guild("1", member))
    }

    fn always(result: bool) -> Requirement {
        Requirement::custom_fn(if result { "always-true" } else { "always-false" }, move |_ctx, _req| {
            Box::pin(async move { Ok::<_, CheckError>(result) })
        })
    }

    fn faulty() -> Requirement {
        Requirement::custom_fn("faulty", |_ctx, _req| {
            Box::pin(async { Err::<bool, _>(CheckError::from("predicate rejected")) })
        })
    }

    #[tokio::test]
    async fn test_absent_settings_are_unrestricted() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let result = resolver.resolve(None, &InvocationContext::none()).await.unwrap();
        assert_eq!(result.status, PermissionStatus::HasPermission);
    }

    #[tokio::test]
    async fn test_empty_settings_follow_default() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let ctx = ctx_with_roles(&[]);

        let allow = RequirementSettings::allow_by_default();
        assert!(resolver.resolve(Some(&allow), &ctx).await.unwrap().is_allowed());

        let deny = RequirementSettings::deny_by_default();
        assert!(!resolver.resolve(Some(&deny), &ctx).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_single_grant_requirement_decides() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let settings = RequirementSettings::deny_by_default()
            .with_requirement(Requirement::role("Moderator").on_success(Effect::Grant).on_failure(Effect::None));

        let moderator = resolver.resolve(Some(&settings), &ctx_with_roles(&["100"])).await.unwrap();
        assert!(moderator.is_allowed());
        assert!(moderator.failed_requirements.is_empty());

        let member = resolver.resolve(Some(&settings), &ctx_with_roles(&[])).await.unwrap();
        assert!(!member.is_allowed());
        assert_eq!(member.failed_requirements.len(), 1);
        assert_eq!(member.failed_requirements[0].identifier(), "Moderator");
    }

    #[tokio::test]
    async fn test_higher_priority_overwrites_lower() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let ctx = ctx_with_roles(&[]);

        // R1 passes and grants, R2 fails and revokes; R2 has higher priority so it is applied last.
        let settings = RequirementSettings::deny_by_default()
            .with_requirement(always(false).on_success(Effect::None).on_failure(Effect::Revoke).with_priority(5))
            .with_requirement(always(true).on_success(Effect::Grant).with_priority(1));

        let result = resolver.resolve(Some(&settings), &ctx).await.unwrap();
        assert_eq!(result.status, PermissionStatus::NoPermission);
        assert_eq!(result.failed_requirements.len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_priority_beats_implicit() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let ctx = ctx_with_roles(&[]);

        let settings = RequirementSettings::deny_by_default()
            .with_requirement(always(true).on_success(Effect::Grant).with_priority(0))
            .with_requirement(always(true).on_success(Effect::Revoke));

        let result = resolver.resolve(Some(&settings), &ctx).await.unwrap();
        assert!(result.is_allowed());
    }

    #[tokio::test]
    async fn test_equal_priority_later_declaration_wins() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let ctx = ctx_with_roles(&[]);

        let grant_then_revoke = RequirementSettings::deny_by_default()
            .with_requirement(always(true).on_success(Effect::Grant))
            .with_requirement(always(true).on_success(Effect::Revoke));
        assert!(!resolver.resolve(Some(&grant_then_revoke), &ctx).await.unwrap().is_allowed());

        let revoke_then_grant = RequirementSettings::deny_by_default()
            .with_requirement(always(true).on_success(Effect::Revoke))
            .with_requirement(always(true).on_success(Effect::Grant));
        assert!(resolver.resolve(Some(&revoke_then_grant), &ctx).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_swapping_noop_requirements_is_irrelevant() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let ctx = ctx_with_roles(&["100"]);

        let noop_a = Requirement::user("someone-else").on_success(Effect::None).on_failure(Effect::None);
        let noop_b = Requirement::guild("elsewhere").on_success(Effect::None).on_failure(Effect::None);
        let grant = Requirement::role("Moderator");

        let first = RequirementSettings::deny_by_default()
            .with_requirements([noop_a.clone(), noop_b.clone(), grant.clone()]);
        let second = RequirementSettings::deny_by_default().with_requirements([noop_b, noop_a, grant]);

        let a = resolver.resolve(Some(&first), &ctx).await.unwrap();
        let b = resolver.resolve(Some(&second), &ctx).await.unwrap();
        assert_eq!(a.status, b.status);
        assert!(a.is_allowed());
    }

    #[tokio::test]
    async fn test_requirement_overrides_default_allow() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);

        let settings = RequirementSettings::allow_by_default()
            .with_requirement(Requirement::user("42").on_success(Effect::Revoke));

        let banned = resolver.resolve(Some(&settings), &ctx_with_roles(&[])).await.unwrap();
        assert!(!banned.is_allowed());
    }

    #[tokio::test]
    async fn test_custom_true_always_grants() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        let settings = RequirementSettings::deny_by_default().with_requirement(always(true).on_success(Effect::Grant));

        for ctx in [InvocationContext::none(), ctx_with_roles(&[]), ctx_with_roles(&["100"])] {
            assert!(resolver.resolve(Some(&settings), &ctx).await.unwrap().is_allowed());
        }
    }

    #[tokio::test]
    async fn test_fault_treated_as_failed() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup);
        assert_eq!(resolver.fault_policy(), FaultPolicy::TreatAsFailed);

        let settings = RequirementSettings::allow_by_default()
            .with_requirement(faulty().on_success(Effect::None).on_failure(Effect::Revoke));

        let result = resolver.resolve(Some(&settings), &ctx_with_roles(&[])).await.unwrap();
        assert!(!result.is_allowed());
        assert_eq!(result.failed_requirements.len(), 1);
        assert_eq!(result.faults.len(), 1);
        assert!(result.faults[0].message.contains("predicate rejected"));
    }

    #[tokio::test]
    async fn test_fault_aborts_under_abort_policy() {
        let lookup = lookup().await;
        let resolver = PermissionResolver::new(&lookup).with_fault_policy(FaultPolicy::Abort);

        let settings = RequirementSettings::allow_by_default().with_requirement(faulty());
        let err = resolver.resolve(Some(&settings), &ctx_with_roles(&[])).await.unwrap_err();

        let PermissionError::Evaluation { requirement, source } = err;
        assert_eq!(requirement, "custom:faulty");
        assert!(matches!(source, EvaluationError::Custom { .. }));
    }

    struct CountingLookup {
        inner: MemoryLookup,
        channel_calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl PlatformLookup for CountingLookup {
        async fn roles(&self, ctx: &InvocationContext, member: &Member) -> LookupResult<Vec<Role>> {
            self.inner.roles(ctx, member).await
        }

        async fn channel(&self, ctx: &InvocationContext) -> LookupResult<Option<Channel>> {
            self.channel_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.channel(ctx).await
        }

        async fn guild(&self, _ctx: &InvocationContext) -> LookupResult<Option<Guild>> {
            Err(LookupError::Unavailable("guild cache offline".into()))
        }
    }

    #[tokio::test]
    async fn test_lookup_fault_is_isolated_to_its_requirement() {
        let channel_calls = Arc::new(AtomicUsize::new(0));
        let lookup = CountingLookup {
            inner: lookup().await,
            channel_calls: channel_calls.clone(),
        };
        let resolver = PermissionResolver::new(&lookup);

        let settings = RequirementSettings::deny_by_default()
            .with_requirement(Requirement::guild("Rustaceans"))
            .with_requirement(Requirement::any_channel().with_priority(2));

        let result = resolver.resolve(Some(&settings), &ctx_with_roles(&[])).await.unwrap();
        assert!(result.is_allowed());
        assert_eq!(result.faults.len(), 1);
        assert_eq!(channel_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fault_policy_parse() {
        assert_eq!(FaultPolicy::parse("abort"), Some(FaultPolicy::Abort));
        assert_eq!(FaultPolicy::parse("Treat-As-Failed"), Some(FaultPolicy::TreatAsFailed));
        assert_eq!(FaultPolicy::parse("retry"), None);
        assert_eq!(FaultPolicy::Abort.as_str(), "abort");
    }
}

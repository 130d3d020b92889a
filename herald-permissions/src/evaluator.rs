//! Requirement evaluation
//!
//! Tests a single requirement against an invocation context. Anything the
//! payload does not carry (role definitions, channel type, guild name) is
//! resolved through a [`PlatformLookup`]. Context that cannot be resolved,
//! such as a setup-time invocation without a principal, makes the test false.
//! A custom check that panics is reported as a faulted check.

use futures::FutureExt;
use herald_context::{InvocationContext, PlatformLookup, PlatformPermissions};
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::error::{CheckError, EvaluationError, EvaluationResult};
use crate::requirement::{Requirement, RequirementKind};

/// Evaluates requirements through a lookup collaborator.
#[derive(Clone, Copy)]
pub struct RequirementEvaluator<'a> {
    lookup: &'a dyn PlatformLookup,
}

impl<'a> RequirementEvaluator<'a> {
    /// Create an evaluator backed by `lookup`.
    pub fn new(lookup: &'a dyn PlatformLookup) -> Self {
        Self { lookup }
    }

    /// Test a requirement.
    ///
    /// Returns `Err` only when the lookup collaborator or a custom check
    /// fails; custom check results are propagated verbatim.
    pub async fn test(&self, ctx: &InvocationContext, requirement: &Requirement) -> EvaluationResult<bool> {
        match &requirement.kind {
            RequirementKind::User(identifier) => Ok(ctx.user().is_some_and(|user| user.is_identified_by(identifier))),

            RequirementKind::Role(identifier) => {
                let Some(member) = self.lookup.member(ctx).await? else {
                    return Ok(false);
                };
                if member.has_role_id(identifier) {
                    return Ok(true);
                }
                let roles = self.lookup.roles(ctx, &member).await?;
                Ok(roles.iter().any(|role| role.is_identified_by(identifier)))
            }

            RequirementKind::Guild(identifier) => {
                let guild = self.lookup.guild(ctx).await?;
                Ok(guild.is_some_and(|guild| guild.is_identified_by(identifier)))
            }

            RequirementKind::Channel(identifier) => {
                let channel = self.lookup.channel(ctx).await?;
                Ok(channel.is_some_and(|channel| channel.is_text() && channel.is_identified_by(identifier)))
            }

            RequirementKind::AnyChannel => {
                let channel = self.lookup.channel(ctx).await?;
                Ok(channel.is_some_and(|channel| channel.is_text()))
            }

            RequirementKind::PlatformPermission(identifier) => {
                let Some(required) = PlatformPermissions::parse_identifier(identifier) else {
                    tracing::warn!(
                        identifier = %identifier,
                        "Unparseable permission requirement, treating as failed"
                    );
                    return Ok(false);
                };
                let Some(member) = self.lookup.member(ctx).await? else {
                    return Ok(false);
                };
                let held = self.lookup.permissions(ctx, &member).await?;
                Ok(held.satisfies(required))
            }

            RequirementKind::Custom(predicate) => {
                let outcome = AssertUnwindSafe(predicate.check(ctx, requirement))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(panicked(payload)));
                outcome.map_err(|source| EvaluationError::Custom {
                    label: predicate.label().to_string(),
                    source,
                })
            }
        }
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> CheckError {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    };
    CheckError::new(format!("check panicked: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PermissionResolver;
    use crate::settings::RequirementSettings;
    use herald_context::{
        Channel, ChannelKind, Guild, Interaction, MemoryLookup, Member, Message, Role, User,
    };

    async fn lookup() -> MemoryLookup {
        let lookup = MemoryLookup::new();
        lookup.add_guild(Guild::new("1", "Rustaceans").with_owner("7")).await;
        lookup.add_channel(Channel::text("10", "general", "1")).await;
        lookup.add_channel(Channel::new("11", "Lounge", ChannelKind::Voice).in_guild("1")).await;
        lookup
            .add_role("1", Role::new("100", "Moderator").with_permissions(PlatformPermissions::KICK_MEMBERS))
            .await;
        lookup
    }

    fn message_in(channel_id: &str, user: User, roles: &[&str]) -> InvocationContext {
        let member = Member::new(user.clone()).with_roles(roles.iter().copied());
        InvocationContext::from_message(Message::new("m1", "!cmd", user, channel_id).in_guild("1", member))
    }

    #[tokio::test]
    async fn test_user_by_id_and_username() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = message_in("10", User::new("42", "Ferris"), &[]);

        assert!(evaluator.test(&ctx, &Requirement::user("42")).await.unwrap());
        assert!(evaluator.test(&ctx, &Requirement::user("ferris")).await.unwrap());
        assert!(!evaluator.test(&ctx, &Requirement::user("43")).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_by_id_and_name() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = message_in("10", User::new("42", "ferris"), &["100"]);

        assert!(evaluator.test(&ctx, &Requirement::role("100")).await.unwrap());
        assert!(evaluator.test(&ctx, &Requirement::role("moderator")).await.unwrap());
        assert!(!evaluator.test(&ctx, &Requirement::role("Admin")).await.unwrap());

        let plain = message_in("10", User::new("43", "crab"), &[]);
        assert!(!evaluator.test(&plain, &Requirement::role("Moderator")).await.unwrap());
    }

    #[tokio::test]
    async fn test_guild_by_id_and_name() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = message_in("10", User::new("42", "ferris"), &[]);

        assert!(evaluator.test(&ctx, &Requirement::guild("1")).await.unwrap());
        assert!(evaluator.test(&ctx, &Requirement::guild("RUSTACEANS")).await.unwrap());
        assert!(!evaluator.test(&ctx, &Requirement::guild("2")).await.unwrap());
    }

    #[tokio::test]
    async fn test_channel_requires_text_channel() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);

        let text = message_in("10", User::new("42", "ferris"), &[]);
        assert!(evaluator.test(&text, &Requirement::channel("General")).await.unwrap());
        assert!(evaluator.test(&text, &Requirement::channel("10")).await.unwrap());

        let voice = message_in("11", User::new("42", "ferris"), &[]);
        assert!(!evaluator.test(&voice, &Requirement::channel("lounge")).await.unwrap());
    }

    #[tokio::test]
    async fn test_any_channel_only_needs_text_channel() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let text = message_in("10", User::new("42", "ferris"), &[]);

        let req = Requirement::any_channel().with_priority(3);
        assert!(evaluator.test(&text, &req).await.unwrap());

        let voice = message_in("11", User::new("42", "ferris"), &[]);
        assert!(!evaluator.test(&voice, &req).await.unwrap());

        let unknown = message_in("99", User::new("42", "ferris"), &[]);
        assert!(!evaluator.test(&unknown, &req).await.unwrap());
    }

    #[tokio::test]
    async fn test_platform_permission() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let moderator = message_in("10", User::new("42", "ferris"), &["100"]);

        assert!(evaluator.test(&moderator, &Requirement::permission("kick_members")).await.unwrap());
        assert!(!evaluator.test(&moderator, &Requirement::permission("kick, ban")).await.unwrap());
        assert!(evaluator.test(&moderator, &Requirement::permission("2")).await.unwrap());
        assert!(!evaluator.test(&moderator, &Requirement::permission("not-a-permission")).await.unwrap());

        let owner = message_in("10", User::new("7", "owner"), &[]);
        assert!(evaluator.test(&owner, &Requirement::permission("kick, ban")).await.unwrap());
    }

    #[tokio::test]
    async fn test_unresolvable_context_is_false() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = InvocationContext::none();

        for req in [
            Requirement::user("42"),
            Requirement::role("Moderator"),
            Requirement::guild("1"),
            Requirement::channel("general"),
            Requirement::any_channel(),
            Requirement::permission("administrator"),
        ] {
            assert!(!evaluator.test(&ctx, &req).await.unwrap(), "{req} should fail without context");
        }
    }

    #[tokio::test]
    async fn test_interaction_without_channel() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = InvocationContext::from_interaction(Interaction::new("i1", "ping", User::new("42", "ferris")));

        assert!(!evaluator.test(&ctx, &Requirement::any_channel()).await.unwrap());
        assert!(evaluator.test(&ctx, &Requirement::user("42")).await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_receives_context_and_requirement() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = message_in("10", User::new("42", "ferris"), &[]);

        let req = Requirement::custom_fn("even-user", |ctx, req| {
            Box::pin(async move {
                assert_eq!(req.identifier(), "even-user");
                let id: u64 = ctx.user().map(|u| u.id.parse().unwrap_or(1)).unwrap_or(1);
                Ok::<_, CheckError>(id % 2 == 0)
            })
        });
        assert!(evaluator.test(&ctx, &req).await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_fault_propagates() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = InvocationContext::none();

        let req = Requirement::custom_fn("broken", |_ctx, _req| {
            Box::pin(async { Err::<bool, _>(CheckError::from("backend offline")) })
        });
        let err = evaluator.test(&ctx, &req).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Custom { ref label, .. } if label == "broken"));
    }

    #[tokio::test]
    async fn test_custom_panic_is_a_fault() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let ctx = message_in("10", User::new("42", "ferris"), &[]);

        let req = Requirement::custom_fn("explosive", |ctx, _req| {
            Box::pin(async move {
                if ctx.user().is_some() {
                    panic!("predicate blew up");
                }
                Ok::<_, CheckError>(true)
            })
        });
        let err = evaluator.test(&ctx, &req).await.unwrap_err();
        match err {
            EvaluationError::Custom { label, source } => {
                assert_eq!(label, "explosive");
                assert!(source.0.contains("predicate blew up"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(evaluator.test(&InvocationContext::none(), &req).await.unwrap());
    }

    #[tokio::test]
    async fn test_unnamed_high_permission_bit_fails_closed() {
        let lookup = lookup().await;
        let evaluator = RequirementEvaluator::new(&lookup);
        let member = message_in("10", User::new("42", "ferris"), &["100"]);

        let moderate = Requirement::permission("1099511627776");
        assert!(!evaluator.test(&member, &moderate).await.unwrap());
        let unnamed = Requirement::permission((1u64 << 55).to_string());
        assert!(!evaluator.test(&member, &unnamed).await.unwrap());
        assert!(!evaluator.test(&member, &Requirement::permission("0")).await.unwrap());

        let settings = RequirementSettings::deny_by_default().with_requirement(moderate);
        let result = PermissionResolver::new(&lookup).resolve(Some(&settings), &member).await.unwrap();
        assert!(!result.is_allowed());

        let owner = message_in("10", User::new("7", "owner"), &[]);
        assert!(evaluator.test(&owner, &unnamed).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_ascii_names_match_case_insensitively() {
        let lookup = MemoryLookup::new();
        lookup.add_channel(Channel::text("20", "général", "2")).await;
        lookup.add_role("2", Role::new("200", "Модератор")).await;
        let evaluator = RequirementEvaluator::new(&lookup);

        let user = User::new("42", "Ünïcode");
        let member = Member::new(user.clone()).with_roles(["200"]);
        let ctx = InvocationContext::from_message(Message::new("m1", "!cmd", user, "20").in_guild("2", member));

        assert!(evaluator.test(&ctx, &Requirement::role("модератор")).await.unwrap());
        assert!(evaluator.test(&ctx, &Requirement::user("ünïcode")).await.unwrap());
        assert!(evaluator.test(&ctx, &Requirement::channel("GÉNÉRAL")).await.unwrap());
    }
}

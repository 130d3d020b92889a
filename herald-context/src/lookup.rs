//! Platform lookup collaborator
//!
//! Requirement evaluation needs more than the inbound payload carries: the
//! definitions of the roles a member holds, the type and name of the current
//! channel, the name and owner of the current guild. The [`PlatformLookup`]
//! trait is the seam through which those are resolved. Implementations must be
//! side-effect-free.
//!
//! [`MemoryLookup`] is an in-memory implementation suitable for tests and for
//! deployments that keep a gateway-fed cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::LookupResult;
use crate::guild::{Channel, Guild};
use crate::invocation::InvocationContext;
use crate::member::{effective_permissions, Member, Role};
use crate::permissions::PlatformPermissions;

/// Resolves principal, channel, and guild data for an invocation.
#[async_trait]
pub trait PlatformLookup: Send + Sync {
    /// Resolve the acting member.
    ///
    /// The default returns the member carried by the payload.
    async fn member(&self, ctx: &InvocationContext) -> LookupResult<Option<Member>> {
        Ok(ctx.member().cloned())
    }

    /// Resolve the role definitions held by `member` in the invocation's guild.
    async fn roles(&self, ctx: &InvocationContext, member: &Member) -> LookupResult<Vec<Role>>;

    /// Resolve the channel the invocation happened in.
    async fn channel(&self, ctx: &InvocationContext) -> LookupResult<Option<Channel>>;

    /// Resolve the guild the invocation happened in.
    async fn guild(&self, ctx: &InvocationContext) -> LookupResult<Option<Guild>>;

    /// Compute the effective permissions of `member`.
    ///
    /// Combines the member's base permissions with those of every held role;
    /// the guild owner has everything.
    async fn permissions(&self, ctx: &InvocationContext, member: &Member) -> LookupResult<PlatformPermissions> {
        let roles = self.roles(ctx, member).await?;
        let guild = self.guild(ctx).await?;
        let owner_id = guild.as_ref().and_then(|g| g.owner_id.as_deref());
        Ok(effective_permissions(member, &roles, owner_id))
    }
}

/// In-memory lookup backed by guild, channel, and role maps.
///
/// # Examples
///
/// ```
/// use herald_context::{Channel, Guild, MemoryLookup, Role};
///
/// async fn setup() -> MemoryLookup {
///     let lookup = MemoryLookup::new();
///     lookup.add_guild(Guild::new("1", "Rustaceans")).await;
///     lookup.add_channel(Channel::text("10", "general", "1")).await;
///     lookup.add_role("1", Role::new("100", "Moderator")).await;
///     lookup
/// }
/// ```
#[derive(Clone, Default)]
pub struct MemoryLookup {
    /// Guilds by ID
    guilds: Arc<RwLock<HashMap<String, Guild>>>,

    /// Channels by ID
    channels: Arc<RwLock<HashMap<String, Channel>>>,

    /// Role definitions by guild ID
    roles: Arc<RwLock<HashMap<String, Vec<Role>>>>,
}

impl std::fmt::Debug for MemoryLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLookup").finish_non_exhaustive()
    }
}

impl MemoryLookup {
    /// Create an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a guild.
    pub async fn add_guild(&self, guild: Guild) {
        self.guilds.write().await.insert(guild.id.clone(), guild);
    }

    /// Insert or replace a channel.
    pub async fn add_channel(&self, channel: Channel) {
        self.channels.write().await.insert(channel.id.clone(), channel);
    }

    /// Insert or replace a role definition in a guild.
    pub async fn add_role(&self, guild_id: impl Into<String>, role: Role) {
        let mut roles = self.roles.write().await;
        let guild_roles = roles.entry(guild_id.into()).or_default();
        guild_roles.retain(|existing| existing.id != role.id);
        guild_roles.push(role);
    }

    /// Remove a channel, returning it if it was known.
    pub async fn remove_channel(&self, channel_id: &str) -> Option<Channel> {
        self.channels.write().await.remove(channel_id)
    }
}

#[async_trait]
impl PlatformLookup for MemoryLookup {
    async fn roles(&self, ctx: &InvocationContext, member: &Member) -> LookupResult<Vec<Role>> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(Vec::new());
        };

        let roles = self.roles.read().await;
        Ok(roles
            .get(guild_id)
            .map(|guild_roles| {
                guild_roles
                    .iter()
                    .filter(|role| member.has_role_id(&role.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn channel(&self, ctx: &InvocationContext) -> LookupResult<Option<Channel>> {
        let Some(channel_id) = ctx.channel_id() else {
            return Ok(None);
        };
        let channel = self.channels.read().await.get(channel_id).cloned();
        if channel.is_none() {
            tracing::debug!(channel_id = %channel_id, "Channel not cached");
        }
        Ok(channel)
    }

    async fn guild(&self, ctx: &InvocationContext) -> LookupResult<Option<Guild>> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(None);
        };
        let guild = self.guilds.read().await.get(guild_id).cloned();
        if guild.is_none() {
            tracing::debug!(guild_id = %guild_id, "Guild not cached");
        }
        Ok(guild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::User;
    use crate::payload::Message;

    async fn fixture() -> MemoryLookup {
        let lookup = MemoryLookup::new();
        lookup.add_guild(Guild::new("1", "Rustaceans").with_owner("7")).await;
        lookup.add_channel(Channel::text("10", "general", "1")).await;
        lookup
            .add_role("1", Role::new("100", "Moderator").with_permissions(PlatformPermissions::KICK_MEMBERS))
            .await;
        lookup.add_role("1", Role::new("101", "Member")).await;
        lookup
    }

    fn guild_message(user: User, roles: &[&str]) -> InvocationContext {
        let member = Member::new(user.clone()).with_roles(roles.iter().copied());
        InvocationContext::from_message(Message::new("m1", "!ping", user, "10").in_guild("1", member))
    }

    #[tokio::test]
    async fn test_resolves_channel_and_guild() {
        let lookup = fixture().await;
        let ctx = guild_message(User::new("42", "ferris"), &[]);

        let channel = lookup.channel(&ctx).await.unwrap().unwrap();
        assert_eq!(channel.name, "general");

        let guild = lookup.guild(&ctx).await.unwrap().unwrap();
        assert_eq!(guild.name, "Rustaceans");
    }

    #[tokio::test]
    async fn test_roles_filtered_by_membership() {
        let lookup = fixture().await;
        let ctx = guild_message(User::new("42", "ferris"), &["100"]);
        let member = lookup.member(&ctx).await.unwrap().unwrap();

        let roles = lookup.roles(&ctx, &member).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Moderator");
    }

    #[tokio::test]
    async fn test_add_role_replaces_existing_definition() {
        let lookup = fixture().await;
        lookup.add_role("1", Role::new("100", "Mods")).await;

        let ctx = guild_message(User::new("42", "ferris"), &["100"]);
        let member = lookup.member(&ctx).await.unwrap().unwrap();
        let roles = lookup.roles(&ctx, &member).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Mods");
    }

    #[tokio::test]
    async fn test_permissions_include_roles_and_owner() {
        let lookup = fixture().await;

        let ctx = guild_message(User::new("42", "ferris"), &["100"]);
        let member = lookup.member(&ctx).await.unwrap().unwrap();
        let perms = lookup.permissions(&ctx, &member).await.unwrap();
        assert!(perms.contains(PlatformPermissions::KICK_MEMBERS));
        assert!(!perms.contains(PlatformPermissions::BAN_MEMBERS));

        let owner_ctx = guild_message(User::new("7", "owner"), &[]);
        let owner = lookup.member(&owner_ctx).await.unwrap().unwrap();
        let perms = lookup.permissions(&owner_ctx, &owner).await.unwrap();
        assert_eq!(perms, PlatformPermissions::all());
    }

    #[tokio::test]
    async fn test_none_context_resolves_nothing() {
        let lookup = fixture().await;
        let ctx = InvocationContext::none();
        assert!(lookup.member(&ctx).await.unwrap().is_none());
        assert!(lookup.channel(&ctx).await.unwrap().is_none());
        assert!(lookup.guild(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_removed_channel_is_unknown() {
        let lookup = fixture().await;
        assert!(lookup.remove_channel("10").await.is_some());

        let ctx = guild_message(User::new("42", "ferris"), &[]);
        assert!(lookup.channel(&ctx).await.unwrap().is_none());
    }
}

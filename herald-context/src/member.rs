//! Users, guild members, and roles
//!
//! This module provides the principal side of the platform model: the user
//! who invoked a command, their guild membership, and the roles a guild
//! defines.

use serde::{Deserialize, Serialize};

use crate::permissions::PlatformPermissions;

/// Compare a display name with an identifier, ignoring case.
///
/// Folding uses Unicode lowercase mappings, so non-Latin names compare too.
pub(crate) fn names_match(name: &str, identifier: &str) -> bool {
    name.chars()
        .flat_map(char::to_lowercase)
        .eq(identifier.chars().flat_map(char::to_lowercase))
}

/// A platform user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Platform snowflake ID
    pub id: String,

    /// Account username
    pub username: String,

    /// Whether the account is a bot
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Create a new (non-bot) user.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            bot: false,
        }
    }

    /// Mark this user as a bot account.
    pub fn as_bot(mut self) -> Self {
        self.bot = true;
        self
    }

    /// Check whether `identifier` names this user.
    ///
    /// The ID is compared exactly, the username case-insensitively.
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.id == identifier || names_match(&self.username, identifier)
    }
}

/// A role defined by a guild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Role ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Position in the guild's role list (higher = more senior)
    #[serde(default)]
    pub position: i32,

    /// Permissions granted by the role
    #[serde(default)]
    pub permissions: PlatformPermissions,
}

impl Role {
    /// Create a role with no permissions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: 0,
            permissions: PlatformPermissions::empty(),
        }
    }

    /// Set the role's position.
    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Set the permissions granted by the role.
    pub fn with_permissions(mut self, permissions: PlatformPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Check whether `identifier` names this role (ID exactly, name case-insensitively).
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.id == identifier || names_match(&self.name, identifier)
    }
}

/// A user's membership in a guild.
///
/// # Examples
///
/// ```
/// use herald_context::{Member, PlatformPermissions, User};
///
/// let member = Member::new(User::new("42", "ferris"))
///     .with_roles(["100", "101"])
///     .with_permissions(PlatformPermissions::SEND_MESSAGES);
///
/// assert!(member.has_role_id("101"));
/// assert_eq!(member.display_name(), "ferris");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// The underlying user
    pub user: User,

    /// Guild-specific nickname
    pub nickname: Option<String>,

    /// IDs of the roles the member holds
    #[serde(default)]
    pub role_ids: Vec<String>,

    /// Base permissions reported for the member (before role aggregation)
    #[serde(default)]
    pub permissions: PlatformPermissions,
}

impl Member {
    /// Create a member without roles, nickname, or permissions.
    pub fn new(user: User) -> Self {
        Self {
            user,
            nickname: None,
            role_ids: Vec::new(),
            permissions: PlatformPermissions::empty(),
        }
    }

    /// Set the nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Set the held role IDs.
    pub fn with_roles<I, S>(mut self, role_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_ids = role_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the base permissions.
    pub fn with_permissions(mut self, permissions: PlatformPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Nickname if set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.username)
    }

    /// Check whether the member holds a role with the given ID.
    pub fn has_role_id(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|id| id == role_id)
    }
}

/// Compute a member's effective guild permissions.
///
/// Resolution order:
/// 1. The guild owner has all permissions
/// 2. Start with the member's base permissions
/// 3. Add permissions from every role the member holds
pub fn effective_permissions(member: &Member, roles: &[Role], guild_owner_id: Option<&str>) -> PlatformPermissions {
    if guild_owner_id == Some(member.user.id.as_str()) {
        return PlatformPermissions::all();
    }

    roles
        .iter()
        .filter(|role| member.has_role_id(&role.id))
        .fold(member.permissions, |perms, role| perms | role.permissions)
}

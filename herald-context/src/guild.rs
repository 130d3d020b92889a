//! Guilds and channels

use serde::{Deserialize, Serialize};

use crate::member::names_match;

/// A guild (community server).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guild {
    /// Guild ID
    pub id: String,

    /// Guild name
    pub name: String,

    /// ID of the owning user
    pub owner_id: Option<String>,
}

impl Guild {
    /// Create a guild without a known owner.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: None,
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Check whether `identifier` names this guild (ID exactly, name case-insensitively).
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.id == identifier || names_match(&self.name, identifier)
    }
}

/// Kinds of channel the platform exposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Regular guild text channel
    Text,
    /// Announcement (news) channel
    Announcement,
    /// Voice channel
    Voice,
    /// Stage channel
    Stage,
    /// Channel category
    Category,
    /// Thread inside a text channel
    Thread,
    /// Direct message channel
    DirectMessage,
}

impl ChannelKind {
    /// Whether commands treat this kind as a guild text channel.
    pub fn is_text(&self) -> bool {
        matches!(self, ChannelKind::Text | ChannelKind::Announcement)
    }

    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Text => "text",
            ChannelKind::Announcement => "announcement",
            ChannelKind::Voice => "voice",
            ChannelKind::Stage => "stage",
            ChannelKind::Category => "category",
            ChannelKind::Thread => "thread",
            ChannelKind::DirectMessage => "direct_message",
        }
    }
}

/// A channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    /// Channel ID
    pub id: String,

    /// Channel name
    pub name: String,

    /// Channel kind
    pub kind: ChannelKind,

    /// Owning guild, `None` for direct messages
    pub guild_id: Option<String>,
}

impl Channel {
    /// Create a guild text channel.
    pub fn text(id: impl Into<String>, name: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ChannelKind::Text,
            guild_id: Some(guild_id.into()),
        }
    }

    /// Create a channel of any kind.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            guild_id: None,
        }
    }

    /// Attach the channel to a guild.
    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Whether this is a guild text channel.
    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    /// Check whether `identifier` names this channel (ID exactly, name case-insensitively).
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.id == identifier || names_match(&self.name, identifier)
    }
}

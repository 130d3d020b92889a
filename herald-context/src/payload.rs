//! Inbound payloads: chat messages and structured interactions
//!
//! These are the two input modalities a command can be invoked through.
//! Messages carry free text that is matched against a command's text rule;
//! interactions carry a command name and a typed option tree.

use serde::{Deserialize, Serialize};

use crate::member::{Member, User};

/// A chat message received from the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Message ID
    pub id: String,

    /// Raw message text
    pub content: String,

    /// Author of the message
    pub author: User,

    /// Author's guild membership (absent in direct messages)
    pub member: Option<Member>,

    /// Channel the message was sent in
    pub channel_id: String,

    /// Guild the message was sent in
    pub guild_id: Option<String>,
}

impl Message {
    /// Create a direct-message style message with no guild context.
    pub fn new(id: impl Into<String>, content: impl Into<String>, author: User, channel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author,
            member: None,
            channel_id: channel_id.into(),
            guild_id: None,
        }
    }

    /// Attach guild context.
    pub fn in_guild(mut self, guild_id: impl Into<String>, member: Member) -> Self {
        self.guild_id = Some(guild_id.into());
        self.member = Some(member);
        self
    }
}

/// Type of an interaction option.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Nested sub-command
    SubCommand,
    /// Group of sub-commands
    SubCommandGroup,
    /// String value
    String,
    /// Integer value
    Integer,
    /// Boolean value
    Boolean,
    /// User mention
    User,
    /// Channel mention
    Channel,
    /// Role mention
    Role,
    /// User or role mention
    Mentionable,
    /// Floating point value
    Number,
    /// Uploaded attachment
    Attachment,
}

impl OptionKind {
    /// Whether this option nests further options (sub-command or group).
    pub fn is_sub_command(&self) -> bool {
        matches!(self, OptionKind::SubCommand | OptionKind::SubCommandGroup)
    }
}

/// One option in an interaction's option tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionOption {
    /// Option name
    pub name: String,

    /// Option type
    pub kind: OptionKind,

    /// Supplied value (absent for sub-commands and groups)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Nested options (only for sub-commands and groups)
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

impl InteractionOption {
    /// Create a value-carrying option.
    pub fn value(name: impl Into<String>, kind: OptionKind, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value: Some(value),
            options: Vec::new(),
        }
    }

    /// Create a sub-command option with nested options.
    pub fn sub_command(name: impl Into<String>, options: Vec<InteractionOption>) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::SubCommand,
            value: None,
            options,
        }
    }

    /// Create a sub-command group option with nested sub-commands.
    pub fn group(name: impl Into<String>, options: Vec<InteractionOption>) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::SubCommandGroup,
            value: None,
            options,
        }
    }
}

/// A structured command invocation.
///
/// # Examples
///
/// ```
/// use herald_context::{Interaction, InteractionOption, OptionKind, User};
///
/// let interaction = Interaction::new("1", "music", User::new("42", "ferris"))
///     .with_options(vec![InteractionOption::sub_command(
///         "play",
///         vec![InteractionOption::value("song", OptionKind::String, "never gonna".into())],
///     )]);
///
/// assert_eq!(interaction.command_name, "music");
/// assert_eq!(interaction.options.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Interaction ID
    pub id: String,

    /// Top-level command name
    pub command_name: String,

    /// Option tree
    #[serde(default)]
    pub options: Vec<InteractionOption>,

    /// Invoking user
    pub user: User,

    /// Invoking member (absent outside guilds)
    pub member: Option<Member>,

    /// Channel the interaction was invoked in
    pub channel_id: Option<String>,

    /// Guild the interaction was invoked in
    pub guild_id: Option<String>,
}

impl Interaction {
    /// Create an interaction with no options and no guild or channel context.
    pub fn new(id: impl Into<String>, command_name: impl Into<String>, user: User) -> Self {
        Self {
            id: id.into(),
            command_name: command_name.into(),
            options: Vec::new(),
            user,
            member: None,
            channel_id: None,
            guild_id: None,
        }
    }

    /// Set the option tree.
    pub fn with_options(mut self, options: Vec<InteractionOption>) -> Self {
        self.options = options;
        self
    }

    /// Set the channel.
    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Attach guild context.
    pub fn in_guild(mut self, guild_id: impl Into<String>, member: Member) -> Self {
        self.guild_id = Some(guild_id.into());
        self.member = Some(member);
        self
    }
}

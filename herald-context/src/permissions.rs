//! # Platform Permissions
//!
//! The chat platform's permission bitmask, plus parsing of the textual forms
//! used by permission requirements.
//!
//! Identifiers may be:
//! - a single permission name (`"manage_messages"`, `"ManageMessages"`, `"kick"`)
//! - a comma-separated list, all of which are required (`"kick, ban"`)
//! - a raw decimal bitmask (`"8"`)

use bitflags::bitflags;

bitflags! {
    /// Platform permissions represented as a 64-bit bitfield.
    ///
    /// Bit positions follow the platform's wire format so raw masks received
    /// from the gateway can be used directly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct PlatformPermissions: u64 {
        /// Create guild invites
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Kick members
        const KICK_MEMBERS          = 1 << 1;
        /// Ban members
        const BAN_MEMBERS           = 1 << 2;
        /// Every permission, bypasses channel overrides
        const ADMINISTRATOR         = 1 << 3;
        /// Create, edit, and delete channels
        const MANAGE_CHANNELS       = 1 << 4;
        /// Edit guild settings
        const MANAGE_GUILD          = 1 << 5;
        /// Add reactions to messages
        const ADD_REACTIONS         = 1 << 6;
        /// View the audit log
        const VIEW_AUDIT_LOG        = 1 << 7;
        /// Priority speaker in voice channels
        const PRIORITY_SPEAKER      = 1 << 8;
        /// Go live
        const STREAM                = 1 << 9;
        /// View channels
        const VIEW_CHANNEL          = 1 << 10;
        /// Send messages
        const SEND_MESSAGES         = 1 << 11;
        /// Send text-to-speech messages
        const SEND_TTS_MESSAGES     = 1 << 12;
        /// Delete and pin messages of others
        const MANAGE_MESSAGES       = 1 << 13;
        /// Links are embedded
        const EMBED_LINKS           = 1 << 14;
        /// Upload files
        const ATTACH_FILES          = 1 << 15;
        /// Read message history
        const READ_MESSAGE_HISTORY  = 1 << 16;
        /// Mention @everyone and @here
        const MENTION_EVERYONE      = 1 << 17;
        /// Use emojis from other guilds
        const USE_EXTERNAL_EMOJIS   = 1 << 18;
        /// View guild insights
        const VIEW_GUILD_INSIGHTS   = 1 << 19;
        /// Connect to voice channels
        const CONNECT               = 1 << 20;
        /// Speak in voice channels
        const SPEAK                 = 1 << 21;
        /// Mute members in voice channels
        const MUTE_MEMBERS          = 1 << 22;
        /// Deafen members in voice channels
        const DEAFEN_MEMBERS        = 1 << 23;
        /// Move members between voice channels
        const MOVE_MEMBERS          = 1 << 24;
        /// Use voice activity detection
        const USE_VAD               = 1 << 25;
        /// Change own nickname
        const CHANGE_NICKNAME       = 1 << 26;
        /// Change nicknames of others
        const MANAGE_NICKNAMES      = 1 << 27;
        /// Create and edit roles below the member's highest role
        const MANAGE_ROLES          = 1 << 28;
        /// Manage webhooks
        const MANAGE_WEBHOOKS       = 1 << 29;
        /// Manage emojis and stickers
        const MANAGE_EMOJIS         = 1 << 30;
        /// Use application (slash) commands
        const USE_APPLICATION_COMMANDS = 1 << 31;
        /// Request to speak in stage channels
        const REQUEST_TO_SPEAK      = 1 << 32;
        /// Create, edit, and delete scheduled events
        const MANAGE_EVENTS         = 1 << 33;
        /// Delete, archive, and view all threads
        const MANAGE_THREADS        = 1 << 34;
        /// Create public and announcement threads
        const CREATE_PUBLIC_THREADS = 1 << 35;
        /// Create private threads
        const CREATE_PRIVATE_THREADS = 1 << 36;
        /// Use stickers from other guilds
        const USE_EXTERNAL_STICKERS = 1 << 37;
        /// Send messages in threads
        const SEND_MESSAGES_IN_THREADS = 1 << 38;
        /// Launch activities in voice channels
        const USE_EMBEDDED_ACTIVITIES = 1 << 39;
        /// Time out members
        const MODERATE_MEMBERS      = 1 << 40;
    }
}

impl PlatformPermissions {
    /// Check whether these permissions satisfy `required`.
    ///
    /// `ADMINISTRATOR` implies every other permission.
    ///
    /// # Example
    ///
    /// ```
    /// use herald_context::PlatformPermissions;
    ///
    /// let admin = PlatformPermissions::ADMINISTRATOR;
    /// assert!(admin.satisfies(PlatformPermissions::BAN_MEMBERS));
    ///
    /// let mods = PlatformPermissions::KICK_MEMBERS;
    /// assert!(!mods.satisfies(PlatformPermissions::KICK_MEMBERS | PlatformPermissions::BAN_MEMBERS));
    /// ```
    pub fn satisfies(&self, required: PlatformPermissions) -> bool {
        self.contains(Self::ADMINISTRATOR) || self.contains(required)
    }

    /// Parse a single permission name.
    ///
    /// Matching ignores case, underscores, dashes, and spaces, so
    /// `MANAGE_MESSAGES`, `manage-messages`, and `ManageMessages` are all
    /// accepted. A few common aliases are supported.
    ///
    /// # Example
    ///
    /// ```
    /// use herald_context::PlatformPermissions;
    ///
    /// assert_eq!(PlatformPermissions::parse_name("ManageMessages"), Some(PlatformPermissions::MANAGE_MESSAGES));
    /// assert_eq!(PlatformPermissions::parse_name("admin"), Some(PlatformPermissions::ADMINISTRATOR));
    /// assert_eq!(PlatformPermissions::parse_name("fly"), None);
    /// ```
    pub fn parse_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "createinstantinvite" | "createinvite" | "invite" => Some(Self::CREATE_INSTANT_INVITE),
            "kickmembers" | "kick" => Some(Self::KICK_MEMBERS),
            "banmembers" | "ban" => Some(Self::BAN_MEMBERS),
            "administrator" | "admin" => Some(Self::ADMINISTRATOR),
            "managechannels" => Some(Self::MANAGE_CHANNELS),
            "manageguild" | "manageserver" => Some(Self::MANAGE_GUILD),
            "addreactions" => Some(Self::ADD_REACTIONS),
            "viewauditlog" | "auditlog" => Some(Self::VIEW_AUDIT_LOG),
            "priorityspeaker" => Some(Self::PRIORITY_SPEAKER),
            "stream" => Some(Self::STREAM),
            "viewchannel" | "readmessages" => Some(Self::VIEW_CHANNEL),
            "sendmessages" => Some(Self::SEND_MESSAGES),
            "sendttsmessages" => Some(Self::SEND_TTS_MESSAGES),
            "managemessages" => Some(Self::MANAGE_MESSAGES),
            "embedlinks" => Some(Self::EMBED_LINKS),
            "attachfiles" => Some(Self::ATTACH_FILES),
            "readmessagehistory" => Some(Self::READ_MESSAGE_HISTORY),
            "mentioneveryone" => Some(Self::MENTION_EVERYONE),
            "useexternalemojis" => Some(Self::USE_EXTERNAL_EMOJIS),
            "viewguildinsights" => Some(Self::VIEW_GUILD_INSIGHTS),
            "connect" => Some(Self::CONNECT),
            "speak" => Some(Self::SPEAK),
            "mutemembers" => Some(Self::MUTE_MEMBERS),
            "deafenmembers" => Some(Self::DEAFEN_MEMBERS),
            "movemembers" => Some(Self::MOVE_MEMBERS),
            "usevad" => Some(Self::USE_VAD),
            "changenickname" => Some(Self::CHANGE_NICKNAME),
            "managenicknames" => Some(Self::MANAGE_NICKNAMES),
            "manageroles" => Some(Self::MANAGE_ROLES),
            "managewebhooks" => Some(Self::MANAGE_WEBHOOKS),
            "manageemojis" | "manageemojisandstickers" => Some(Self::MANAGE_EMOJIS),
            "useapplicationcommands" | "useslashcommands" => Some(Self::USE_APPLICATION_COMMANDS),
            "requesttospeak" => Some(Self::REQUEST_TO_SPEAK),
            "manageevents" => Some(Self::MANAGE_EVENTS),
            "managethreads" => Some(Self::MANAGE_THREADS),
            "createpublicthreads" => Some(Self::CREATE_PUBLIC_THREADS),
            "createprivatethreads" => Some(Self::CREATE_PRIVATE_THREADS),
            "useexternalstickers" => Some(Self::USE_EXTERNAL_STICKERS),
            "sendmessagesinthreads" => Some(Self::SEND_MESSAGES_IN_THREADS),
            "useembeddedactivities" | "startembeddedactivities" => Some(Self::USE_EMBEDDED_ACTIVITIES),
            "moderatemembers" | "timeout" => Some(Self::MODERATE_MEMBERS),
            _ => None,
        }
    }

    /// Parse a requirement identifier into the set of permissions it demands.
    ///
    /// Returns `None` when the identifier is empty, any listed name is
    /// unknown, or a raw mask is zero; a requirement with an unparseable
    /// identifier never passes. Raw masks keep bits this type does not name,
    /// so only members actually holding them satisfy the requirement.
    ///
    /// # Example
    ///
    /// ```
    /// use herald_context::PlatformPermissions;
    ///
    /// let both = PlatformPermissions::parse_identifier("kick, BAN_MEMBERS").unwrap();
    /// assert_eq!(both, PlatformPermissions::KICK_MEMBERS | PlatformPermissions::BAN_MEMBERS);
    ///
    /// let raw = PlatformPermissions::parse_identifier("8").unwrap();
    /// assert_eq!(raw, PlatformPermissions::ADMINISTRATOR);
    ///
    /// let unnamed = PlatformPermissions::parse_identifier("36028797018963968").unwrap();
    /// assert!(!PlatformPermissions::MANAGE_GUILD.satisfies(unnamed));
    /// ```
    pub fn parse_identifier(identifier: &str) -> Option<Self> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<u64>()
                .ok()
                .filter(|mask| *mask != 0)
                .map(Self::from_bits_retain);
        }

        let mut required = Self::empty();
        for name in trimmed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            required |= Self::parse_name(name)?;
        }

        if required.is_empty() {
            None
        } else {
            Some(required)
        }
    }
}

impl Default for PlatformPermissions {
    fn default() -> Self {
        Self::empty()
    }
}

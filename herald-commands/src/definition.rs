//! Command definitions

use crate::matcher::MatchingSettings;
use crate::schema::InteractionSchema;
use serde::{Deserialize, Serialize};

/// Where a permission denial is reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// Nothing is reported
    #[default]
    Silent,
    /// A direct message to the invoking user
    DirectMessage,
    /// A reply in the invoking channel
    Channel,
}

impl FeedbackType {
    /// Get the string representation of the feedback type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Silent => "silent",
            FeedbackType::DirectMessage => "direct_message",
            FeedbackType::Channel => "channel",
        }
    }

    /// Parse a feedback type from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "silent" | "none" => Some(FeedbackType::Silent),
            "direct_message" | "direct" | "dm" => Some(FeedbackType::DirectMessage),
            "channel" | "reply" => Some(FeedbackType::Channel),
            _ => None,
        }
    }

    /// Whether a denial should be delivered at all.
    pub fn is_silent(&self) -> bool {
        matches!(self, FeedbackType::Silent)
    }
}

/// Static description of a command and how it is invoked.
///
/// A command may be reachable from messages, interactions, or both.
///
/// # Examples
///
/// ```
/// use herald_commands::{CommandDefinition, FeedbackType, MatchingSettings};
///
/// let ping = CommandDefinition::new("ping", "Check the bot is alive")
///     .with_matching(MatchingSettings::prefixed("!", "ping"))
///     .with_feedback(FeedbackType::Channel);
///
/// assert!(ping.accepts_messages());
/// assert!(!ping.accepts_interactions());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandDefinition {
    /// Command name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Message matching rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching: Option<MatchingSettings>,

    /// Structured interaction schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionSchema>,

    /// Denial reporting
    #[serde(default)]
    pub feedback: FeedbackType,
}

impl CommandDefinition {
    /// Create a definition with no inputs configured.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            matching: None,
            interaction: None,
            feedback: FeedbackType::default(),
        }
    }

    /// Set the message matching rule.
    pub fn with_matching(mut self, matching: MatchingSettings) -> Self {
        self.matching = Some(matching);
        self
    }

    /// Set the interaction schema.
    pub fn with_interaction(mut self, schema: InteractionSchema) -> Self {
        self.interaction = Some(schema);
        self
    }

    /// Set how denials are reported.
    pub fn with_feedback(mut self, feedback: FeedbackType) -> Self {
        self.feedback = feedback;
        self
    }

    /// Whether messages can invoke this command.
    pub fn accepts_messages(&self) -> bool {
        self.matching.is_some()
    }

    /// Whether interactions can invoke this command.
    pub fn accepts_interactions(&self) -> bool {
        self.interaction.is_some()
    }
}

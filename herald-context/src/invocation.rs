//! Invocation context for a single command dispatch
//!
//! This module provides the InvocationContext type that describes one
//! inbound command invocation: which modality it arrived through, the payload
//! that carries it, and identity/timing metadata for log correlation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::member::{Member, User};
use crate::payload::{Interaction, Message};

/// The input modality of an invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Free-text chat message
    Message,
    /// Structured interaction
    Interaction,
    /// No inbound payload (setup-time evaluation)
    None,
}

impl Modality {
    /// Get the string representation of the modality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Message => "message",
            Modality::Interaction => "interaction",
            Modality::None => "none",
        }
    }
}

/// The payload an invocation carries.
///
/// Exactly one of a message or an interaction is populated, or neither for
/// setup-time evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Invoked through a chat message
    Message(Message),
    /// Invoked through an interaction
    Interaction(Interaction),
    /// No payload
    None,
}

/// Context for one command invocation.
///
/// Created fresh for each dispatch and discarded once the decision and the
/// handler result have been consumed.
///
/// # Examples
///
/// ```
/// use herald_context::{InvocationContext, Message, Modality, User};
///
/// let message = Message::new("m1", "!ping", User::new("42", "ferris"), "10");
/// let ctx = InvocationContext::from_message(message);
///
/// assert_eq!(ctx.modality(), Modality::Message);
/// assert_eq!(ctx.user().map(|u| u.id.as_str()), Some("42"));
/// assert_eq!(ctx.channel_id(), Some("10"));
///
/// let setup = InvocationContext::none();
/// assert!(setup.user().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationContext {
    /// Unique invocation ID
    pub id: Uuid,

    /// When the invocation was received
    pub received_at: DateTime<Utc>,

    /// The carried payload
    pub payload: Payload,
}

impl InvocationContext {
    fn with_payload(payload: Payload) -> Self {
        Self {
            id: Uuid::now_v7(),
            received_at: Utc::now(),
            payload,
        }
    }

    /// Create a context for a chat message.
    pub fn from_message(message: Message) -> Self {
        Self::with_payload(Payload::Message(message))
    }

    /// Create a context for an interaction.
    pub fn from_interaction(interaction: Interaction) -> Self {
        Self::with_payload(Payload::Interaction(interaction))
    }

    /// Create a payload-less context for setup-time evaluation.
    pub fn none() -> Self {
        Self::with_payload(Payload::None)
    }

    /// Get the invocation's modality.
    pub fn modality(&self) -> Modality {
        match self.payload {
            Payload::Message(_) => Modality::Message,
            Payload::Interaction(_) => Modality::Interaction,
            Payload::None => Modality::None,
        }
    }

    /// The message payload, if this is a message invocation.
    pub fn message(&self) -> Option<&Message> {
        match &self.payload {
            Payload::Message(message) => Some(message),
            _ => None,
        }
    }

    /// The interaction payload, if this is an interaction invocation.
    pub fn interaction(&self) -> Option<&Interaction> {
        match &self.payload {
            Payload::Interaction(interaction) => Some(interaction),
            _ => None,
        }
    }

    /// The acting user.
    pub fn user(&self) -> Option<&User> {
        match &self.payload {
            Payload::Message(message) => Some(&message.author),
            Payload::Interaction(interaction) => Some(&interaction.user),
            Payload::None => None,
        }
    }

    /// The acting guild member, when invoked inside a guild.
    pub fn member(&self) -> Option<&Member> {
        match &self.payload {
            Payload::Message(message) => message.member.as_ref(),
            Payload::Interaction(interaction) => interaction.member.as_ref(),
            Payload::None => None,
        }
    }

    /// ID of the channel the invocation happened in.
    pub fn channel_id(&self) -> Option<&str> {
        match &self.payload {
            Payload::Message(message) => Some(message.channel_id.as_str()),
            Payload::Interaction(interaction) => interaction.channel_id.as_deref(),
            Payload::None => None,
        }
    }

    /// ID of the guild the invocation happened in.
    pub fn guild_id(&self) -> Option<&str> {
        match &self.payload {
            Payload::Message(message) => message.guild_id.as_deref(),
            Payload::Interaction(interaction) => interaction.guild_id.as_deref(),
            Payload::None => None,
        }
    }
}

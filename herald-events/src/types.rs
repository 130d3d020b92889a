//! Gateway event types
//!
//! Events delivered by the connection layer. Messages and interactions are
//! dispatched; status changes only update the published connection state.

use chrono::{DateTime, Utc};
use herald_context::{Interaction, InvocationContext, Message};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection state of the gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Not connected yet, or cleanly closed
    #[default]
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Ready and receiving events
    Connected,
    /// Reconnecting after a dropped session
    Resuming,
}

impl ConnectionStatus {
    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Resuming => "resuming",
        }
    }

    /// Parse a status from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disconnected" | "closed" => Some(ConnectionStatus::Disconnected),
            "connecting" => Some(ConnectionStatus::Connecting),
            "connected" | "ready" => Some(ConnectionStatus::Connected),
            "resuming" | "reconnecting" => Some(ConnectionStatus::Resuming),
            _ => None,
        }
    }

    /// Whether events are flowing.
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// Event payload from the connection layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEventKind {
    /// A message was created
    Message(Message),
    /// A command interaction was created
    Interaction(Interaction),
    /// The connection changed state
    Status(ConnectionStatus),
}

impl GatewayEventKind {
    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            GatewayEventKind::Message(_) => "message",
            GatewayEventKind::Interaction(_) => "interaction",
            GatewayEventKind::Status(_) => "status",
        }
    }
}

/// Envelope around a gateway event.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    /// Unique event ID
    pub id: Uuid,

    /// When the event was received
    pub received_at: DateTime<Utc>,

    /// Event payload
    pub kind: GatewayEventKind,
}

impl GatewayEvent {
    /// Wrap an event payload.
    pub fn new(kind: GatewayEventKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            received_at: Utc::now(),
            kind,
        }
    }

    /// A message event.
    pub fn message(message: Message) -> Self {
        Self::new(GatewayEventKind::Message(message))
    }

    /// An interaction event.
    pub fn interaction(interaction: Interaction) -> Self {
        Self::new(GatewayEventKind::Interaction(interaction))
    }

    /// A connection status event.
    pub fn status(status: ConnectionStatus) -> Self {
        Self::new(GatewayEventKind::Status(status))
    }

    /// Convert into an invocation context, if the event is dispatchable.
    pub fn into_invocation(self) -> Option<InvocationContext> {
        match self.kind {
            GatewayEventKind::Message(message) => Some(InvocationContext::from_message(message)),
            GatewayEventKind::Interaction(interaction) => Some(InvocationContext::from_interaction(interaction)),
            GatewayEventKind::Status(_) => None,
        }
    }
}

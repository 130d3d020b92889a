//! # Herald Context
//!
//! This crate provides the platform model and the invocation context that
//! Herald's permission requirements and command dispatch operate on.
//!
//! ## Overview
//!
//! The herald-context crate handles:
//! - **Principals**: Users, guild members, and roles
//! - **Places**: Guilds and channels (text vs. other kinds)
//! - **Payloads**: Chat messages and structured interactions
//! - **Invocation Context**: One command invocation, in exactly one modality
//! - **Platform Permissions**: The platform's permission bitmask
//! - **Lookup**: The collaborator that resolves roles, channels, and guilds
//!
//! ## Architecture
//!
//! ```text
//! InvocationContext
//!   ├─ Payload::Message ─→ Message (author, member?, channel, guild?)
//!   ├─ Payload::Interaction ─→ Interaction (command name, option tree, ...)
//!   └─ Payload::None (setup-time evaluation)
//!
//! PlatformLookup
//!   ├─ member(ctx)  ├─ roles(ctx, member)
//!   ├─ channel(ctx) └─ guild(ctx)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use herald_context::{Channel, InvocationContext, MemoryLookup, Message, Member, PlatformLookup, User};
//!
//! async fn example() {
//!     let lookup = MemoryLookup::new();
//!     lookup.add_channel(Channel::text("10", "general", "1")).await;
//!
//!     let author = User::new("42", "ferris");
//!     let message = Message::new("m1", "!ping", author.clone(), "10")
//!         .in_guild("1", Member::new(author));
//!     let ctx = InvocationContext::from_message(message);
//!
//!     let channel = lookup.channel(&ctx).await.unwrap();
//!     assert!(channel.map(|c| c.is_text()).unwrap_or(false));
//! }
//! ```

pub mod error;
pub mod guild;
pub mod invocation;
pub mod lookup;
pub mod member;
pub mod payload;
pub mod permissions;

// Re-export main types for convenience
pub use error::{LookupError, LookupResult};
pub use guild::{Channel, ChannelKind, Guild};
pub use invocation::{InvocationContext, Modality, Payload};
pub use lookup::{MemoryLookup, PlatformLookup};
pub use member::{effective_permissions, Member, Role, User};
pub use payload::{Interaction, InteractionOption, Message, OptionKind};
pub use permissions::PlatformPermissions;

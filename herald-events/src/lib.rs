//! # Herald Events
//!
//! Gateway event intake for Herald.
//!
//! ## Overview
//!
//! The herald-events crate handles:
//! - **Event Types**: messages, interactions and connection status changes
//! - **Event Channel**: a bounded `tokio::mpsc` channel fed by the connection layer
//! - **Event Loop**: one independent task per message or interaction
//! - **Connection Status**: published through a `watch` channel owned by the loop
//!
//! ## Usage
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use herald_context::{InvocationContext, Message, User};
//! use herald_events::{event_channel, EventHandler, EventLoop, EventResult, GatewayEvent};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl EventHandler for Printer {
//!     async fn handle(&self, ctx: InvocationContext) -> EventResult<()> {
//!         println!("{:?}", ctx.modality());
//!         Ok(())
//!     }
//! }
//!
//! async fn run() {
//!     let (sender, receiver) = event_channel(256).unwrap();
//!     let event_loop = EventLoop::new(receiver, Arc::new(Printer));
//!     let worker = tokio::spawn(event_loop.run());
//!
//!     let message = Message::new("1", "!ping", User::new("42", "ferris"), "10");
//!     sender.send(GatewayEvent::message(message)).await.unwrap();
//!
//!     drop(sender);
//!     let stats = worker.await.unwrap();
//!     assert_eq!(stats.events_dispatched, 1);
//! }
//! ```

pub mod bus;
pub mod error;
pub mod types;

pub use bus::{event_channel, EventHandler, EventLoop, EventLoopStats, EventReceiver, EventSender};
pub use error::{EventError, EventResult};
pub use types::{ConnectionStatus, GatewayEvent, GatewayEventKind};

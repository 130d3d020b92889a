//! Event intake and fan-out
//!
//! The connection layer pushes [`GatewayEvent`]s into a bounded channel.
//! An [`EventLoop`] drains it, publishes connection status through a
//! `watch` channel and runs every message or interaction as its own task.
//! The number of tasks in flight is capped; once the cap is reached the loop
//! stops receiving until a task finishes, so a full channel pushes back on
//! senders.

use crate::error::{EventError, EventResult};
use crate::types::{ConnectionStatus, GatewayEvent, GatewayEventKind};
use async_trait::async_trait;
use herald_context::InvocationContext;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};

/// Create a bounded event channel.
///
/// Returns [`EventError::InvalidConfig`] for a zero capacity.
pub fn event_channel(capacity: usize) -> EventResult<(EventSender, EventReceiver)> {
    if capacity == 0 {
        return Err(EventError::InvalidConfig("event capacity must be at least 1".to_string()));
    }
    let (inner, receiver) = mpsc::channel(capacity);
    Ok((
        EventSender { inner, capacity },
        EventReceiver {
            inner: receiver,
            capacity,
        },
    ))
}

/// Producer side of the event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::Sender<GatewayEvent>,
    capacity: usize,
}

impl EventSender {
    /// Send an event, waiting for capacity.
    pub async fn send(&self, event: GatewayEvent) -> EventResult<()> {
        self.inner.send(event).await.map_err(|_| EventError::ChannelClosed)
    }

    /// Send an event without waiting.
    pub fn try_send(&self, event: GatewayEvent) -> EventResult<()> {
        self.inner.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EventError::ChannelFull(self.capacity),
            mpsc::error::TrySendError::Closed(_) => EventError::ChannelClosed,
        })
    }

    /// Channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the event loop has gone away.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Consumer side of the event channel, handed to an [`EventLoop`].
#[derive(Debug)]
pub struct EventReceiver {
    inner: mpsc::Receiver<GatewayEvent>,
    capacity: usize,
}

/// Handler invoked once per dispatchable event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one invocation.
    async fn handle(&self, ctx: InvocationContext) -> EventResult<()>;
}

/// Event loop statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLoopStats {
    /// Events taken off the channel
    pub events_received: u64,
    /// Messages and interactions handed to the handler
    pub events_dispatched: u64,
    /// Connection status changes published
    pub status_changes: u64,
    /// Handler calls that returned an error
    pub handler_errors: u64,
    /// Handler tasks that panicked
    pub handler_panics: u64,
    /// Most handler tasks running at once
    pub peak_in_flight: usize,
}

/// Drains an [`EventReceiver`] into an [`EventHandler`].
pub struct EventLoop {
    receiver: EventReceiver,
    handler: Arc<dyn EventHandler>,
    status: watch::Sender<ConnectionStatus>,
    max_in_flight: usize,
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("status", &*self.status.borrow())
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}

impl EventLoop {
    /// Create an event loop.
    ///
    /// In-flight handler tasks are capped at the channel capacity.
    pub fn new(receiver: EventReceiver, handler: Arc<dyn EventHandler>) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        let max_in_flight = receiver.capacity;
        Self {
            receiver,
            handler,
            status,
            max_in_flight,
        }
    }

    /// Cap the number of handler tasks running at once (minimum 1).
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// The in-flight task cap.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Subscribe to connection status updates.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Run until every sender is dropped and all in-flight handlers finish.
    pub async fn run(self) -> EventLoopStats {
        let EventLoop {
            mut receiver,
            handler,
            status,
            max_in_flight,
        } = self;
        let mut stats = EventLoopStats::default();
        let mut tasks: JoinSet<EventResult<()>> = JoinSet::new();

        tracing::info!(max_in_flight, "Event loop started");

        loop {
            tokio::select! {
                event = receiver.inner.recv(), if tasks.len() < max_in_flight => {
                    let Some(event) = event else {
                        break;
                    };
                    stats.events_received += 1;
                    accept(event, &handler, &status, &mut tasks, &mut stats);
                    stats.peak_in_flight = stats.peak_in_flight.max(tasks.len());
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    reap(joined, &mut stats);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            reap(joined, &mut stats);
        }

        tracing::info!(
            received = stats.events_received,
            dispatched = stats.events_dispatched,
            handler_errors = stats.handler_errors,
            handler_panics = stats.handler_panics,
            "Event loop stopped"
        );

        stats
    }
}

fn accept(
    event: GatewayEvent,
    handler: &Arc<dyn EventHandler>,
    status: &watch::Sender<ConnectionStatus>,
    tasks: &mut JoinSet<EventResult<()>>,
    stats: &mut EventLoopStats,
) {
    let event_id = event.id;
    let event_type = event.kind.event_type();

    if let GatewayEventKind::Status(next) = event.kind {
        let previous = status.send_replace(next);
        if previous != next {
            stats.status_changes += 1;
            tracing::info!(
                from = previous.as_str(),
                to = next.as_str(),
                "Connection status changed"
            );
        }
        return;
    }

    let Some(ctx) = event.into_invocation() else {
        return;
    };

    tracing::debug!(event_id = %event_id, event_type, "Dispatching event");
    stats.events_dispatched += 1;

    let handler = handler.clone();
    tasks.spawn(async move { handler.handle(ctx).await });
}

fn reap(joined: Result<EventResult<()>, JoinError>, stats: &mut EventLoopStats) {
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            stats.handler_errors += 1;
            tracing::warn!(error_code = e.error_code(), error = %e, "Event handler failed");
        }
        Err(e) => {
            stats.handler_panics += 1;
            tracing::error!(error = %e, "Event handler task aborted");
        }
    }
}

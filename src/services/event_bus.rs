//! Process-wide event bus for host-facing decoration events.
//!
//! Broadcast based with sequence numbering, so any number of consumers
//! (renderers, the CLI, tests) can follow user and decoration updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::models::{Decoration, LiveUser};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorEvent {
    pub id: EventId,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    /// A live user changed; renderers should redraw it
    UserUpdate { user: LiveUser },
    /// The current user uploaded a decoration
    DecorationCreated { decoration: Decoration },
    /// The current user deleted a decoration
    DecorationDeleted { hash: String },
}

impl EventPayload {
    /// Wire name of the event type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserUpdate { .. } => "USER_UPDATE",
            Self::DecorationCreated { .. } => "DECORATION_CREATED",
            Self::DecorationDeleted { .. } => "DECORATION_DELETED",
        }
    }
}

/// Configuration for the EventBus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for the broadcast channel.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Central event bus for broadcasting events to multiple consumers.
pub struct EventBus {
    sender: broadcast::Sender<DecorEvent>,
    sequence: AtomicU64,
}

impl EventBus {
    /// Create a new EventBus with the given configuration.
    pub fn new(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity);
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    /// Publish a payload, returning the envelope that was broadcast.
    pub fn publish(&self, payload: EventPayload) -> DecorEvent {
        let event = DecorEvent {
            id: EventId::new(),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            timestamp: Utc::now(),
            payload,
        };

        tracing::trace!(kind = event.payload.kind(), sequence = event.sequence, "Publishing event");

        // No subscribers is not an error
        let _ = self.sender.send(event.clone());
        event
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<DecorEvent> {
        self.sender.subscribe()
    }

    /// Get the current sequence number.
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

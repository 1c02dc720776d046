//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`ProjectEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use worksite_core::types::DbId;

// ---------------------------------------------------------------------------
// ProjectEvent
// ---------------------------------------------------------------------------

/// Well-known event type names.
pub mod event_types {
    pub const PROJECT_CREATED: &str = "project.created";
    pub const PROJECT_UPDATED: &str = "project.updated";
    pub const PROJECT_STATUS_CHANGED: &str = "project.status_changed";
    pub const PROJECT_DELETED: &str = "project.deleted";
    pub const PROJECT_LOCKED: &str = "project.locked";
    pub const PROJECT_UNLOCKED: &str = "project.unlocked";
    pub const EXTRACTION_APPLIED: &str = "extraction.applied";
}

/// A domain event scoped to one project.
///
/// `project_id` doubles as the realtime room key: every subscriber viewing
/// that project receives the event's envelope. Constructed via
/// [`ProjectEvent::new`] and enriched with the builder methods
/// [`with_actor`](ProjectEvent::with_actor) and
/// [`with_payload`](ProjectEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEvent {
    /// Dot-separated event name, e.g. `"project.updated"`.
    pub event_type: String,

    /// The project this event belongs to; also the fan-out room key.
    pub project_id: DbId,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ProjectEvent {
    /// Create a new event for a project.
    ///
    /// Actor defaults to `None` and the payload to an empty object.
    pub fn new(event_type: impl Into<String>, project_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            project_id,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ProjectEvent`]. Publishing never
/// blocks and never fails from the caller's perspective: correctness of the
/// system of record does not depend on delivery.
pub struct EventBus {
    sender: broadcast::Sender<ProjectEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// clients re-fetch state over HTTP on reconnect instead of relying on
    /// replay.
    pub fn publish(&self, event: ProjectEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

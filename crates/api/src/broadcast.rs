//! Event-to-room fan-out engine.
//!
//! [`ProjectEventRouter`] subscribes to the event bus and pushes every
//! [`ProjectEvent`] to the WebSocket room of the project it belongs to.
//! Delivery is strictly best-effort: any failure here is logged and
//! swallowed, never surfaced to the mutation that produced the event. The
//! system of record does not depend on realtime delivery.
//!
//! Because a single task drains the bus in publication order, two events
//! for the same project reach the room in the order their mutations
//! committed. No ordering holds across different projects' rooms.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use worksite_core::realtime::UpdateEnvelope;
use worksite_events::ProjectEvent;

use crate::ws::WsManager;

/// Routes project events to their realtime rooms.
pub struct ProjectEventRouter {
    ws_manager: Arc<WsManager>,
}

impl ProjectEventRouter {
    /// Create a new router targeting the given WebSocket manager.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main fan-out loop.
    ///
    /// Consumes events from `receiver` until the channel closes (i.e. the
    /// [`EventBus`](worksite_events::EventBus) is dropped during shutdown).
    pub async fn run(self, mut receiver: broadcast::Receiver<ProjectEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.fan_out(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Dropped events are acceptable: clients re-fetch on
                    // reconnect instead of relying on replay.
                    tracing::warn!(skipped = n, "Realtime fan-out lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, realtime fan-out shutting down");
                    break;
                }
            }
        }
    }

    /// Wrap one event in the wire envelope and push it to the room.
    async fn fan_out(&self, event: ProjectEvent) {
        let envelope = UpdateEnvelope {
            kind: event.event_type,
            project_id: event.project_id,
            data: event.payload,
            timestamp: event.timestamp,
        };

        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    project_id = envelope.project_id,
                    "Failed to serialize realtime envelope"
                );
                return;
            }
        };

        self.ws_manager
            .broadcast_to_project(envelope.project_id, Message::Text(json.into()))
            .await;

        tracing::debug!(
            project_id = envelope.project_id,
            kind = %envelope.kind,
            "Broadcast to project room"
        );
    }
}

//! Realtime room protocol for project subscriptions.
//!
//! This module lives in `core` (zero internal deps) so the WebSocket
//! handlers, the event fan-out task, and any future CLI tooling share the
//! same message shapes.
//!
//! A room is the set of connections currently viewing one project. Clients
//! join and leave rooms over the socket; the server pushes every committed
//! mutation of a project to its room as an [`UpdateEnvelope`]. Delivery is
//! best-effort and at-most-once: a reconnecting client must re-fetch the
//! project over HTTP rather than rely on missed messages.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Client -> server messages
// ---------------------------------------------------------------------------

/// Messages a client may send over the WebSocket.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator so
/// the frontend can route messages by type string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Client is now viewing this project.
    #[serde(rename = "room.join")]
    RoomJoin { project_id: DbId },

    /// Client is no longer viewing this project.
    #[serde(rename = "room.leave")]
    RoomLeave { project_id: DbId },
}

// ---------------------------------------------------------------------------
// Server -> client messages
// ---------------------------------------------------------------------------

/// Acknowledgements and errors the server sends to a single connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The join was accepted; `room_size` counts connections now in the room.
    #[serde(rename = "room.joined")]
    RoomJoined { project_id: DbId, room_size: usize },

    /// The leave was processed (a no-op leave still acks).
    #[serde(rename = "room.left")]
    RoomLeft { project_id: DbId },

    /// The client sent something the server could not act on.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Envelope pushed to every member of a project room when a mutation
/// commits.
///
/// `kind` names the mutation (`project.updated`, `project.status_changed`,
/// `project.locked`, ...); `data` carries the event-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "projectId")]
    pub project_id: DbId,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate a project reference in a room message.
pub fn validate_project_ref(project_id: DbId) -> Result<(), String> {
    if project_id <= 0 {
        return Err(format!("project_id must be positive, got {project_id}"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

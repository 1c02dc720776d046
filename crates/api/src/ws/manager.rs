use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use worksite_core::types::{DbId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID, if the connection has been authenticated.
    pub user_id: Option<DbId>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections and their project rooms.
///
/// A room is the set of connections currently viewing one project; room
/// broadcasts are the realtime half of the collaborative editing core.
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`,
/// constructed once in `main`, and injected through `AppState` -- never
/// held as a process-wide mutable handle.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
    /// project_id -> connection ids currently joined to that room.
    rooms: RwLock<HashMap<DbId, HashSet<String>>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<DbId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, leaving every room it had joined.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);

        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(conn_id);
            !members.is_empty()
        });
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Join a connection to a project's room.
    ///
    /// Idempotent: joining a room the connection is already in is a no-op.
    /// Returns the room size after the join.
    pub async fn join_room(&self, conn_id: &str, project_id: DbId) -> usize {
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(project_id).or_default();
        members.insert(conn_id.to_string());
        members.len()
    }

    /// Remove a connection from a project's room.
    ///
    /// Idempotent: leaving a room the connection never joined is a no-op,
    /// not an error.
    pub async fn leave_room(&self, conn_id: &str, project_id: DbId) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(&project_id) {
            members.remove(conn_id);
            if members.is_empty() {
                rooms.remove(&project_id);
            }
        }
    }

    /// Number of connections currently joined to a project's room.
    pub async fn room_size(&self, project_id: DbId) -> usize {
        self.rooms
            .read()
            .await
            .get(&project_id)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    /// Send a message to every member of a project's room.
    ///
    /// Best-effort, at-most-once: connections whose send channels are
    /// closed are silently skipped (they will be cleaned up on their next
    /// receive loop iteration). Non-members receive nothing.
    pub async fn broadcast_to_project(&self, project_id: DbId, message: Message) {
        let rooms = self.rooms.read().await;
        let Some(members) = rooms.get(&project_id) else {
            return;
        };

        let conns = self.connections.read().await;
        for conn_id in members {
            if let Some(conn) = conns.get(conn_id) {
                let _ = conn.sender.send(message.clone());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Connection-wide operations
    // -----------------------------------------------------------------------

    /// Broadcast a message to all connected clients regardless of room.
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.user_id == Some(user_id) {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Send a message to one connection by its ID.
    pub async fn send_to_conn(&self, conn_id: &str, message: Message) {
        let conns = self.connections.read().await;
        if let Some(conn) = conns.get(conn_id) {
            let _ = conn.sender.send(message);
        }
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear all state.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        self.rooms.write().await.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

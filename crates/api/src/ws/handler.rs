use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use worksite_core::realtime::{validate_project_ref, ClientMessage, ServerMessage};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by two spawned tasks (sender + receiver).
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound room join/leave messages on the current task.
///   4. Cleans up (including room membership) on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = ws_manager.add(conn_id.clone(), None).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                dispatch_client_message(&ws_manager, &conn_id, text.as_str()).await;
            }
            Ok(_msg) => {
                // Binary and other frames are ignored.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection (and its room memberships), abort sender.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Parse and act on one inbound text frame.
///
/// Malformed messages get an error reply instead of killing the
/// connection; join and leave are both idempotent and always acked.
async fn dispatch_client_message(ws_manager: &WsManager, conn_id: &str, text: &str) {
    let parsed: Result<ClientMessage, _> = serde_json::from_str(text);

    let reply = match parsed {
        Ok(ClientMessage::RoomJoin { project_id }) => match validate_project_ref(project_id) {
            Ok(()) => {
                let room_size = ws_manager.join_room(conn_id, project_id).await;
                tracing::info!(conn_id = %conn_id, project_id, room_size, "Joined project room");
                ServerMessage::RoomJoined {
                    project_id,
                    room_size,
                }
            }
            Err(message) => ServerMessage::Error { message },
        },
        Ok(ClientMessage::RoomLeave { project_id }) => match validate_project_ref(project_id) {
            Ok(()) => {
                ws_manager.leave_room(conn_id, project_id).await;
                tracing::info!(conn_id = %conn_id, project_id, "Left project room");
                ServerMessage::RoomLeft { project_id }
            }
            Err(message) => ServerMessage::Error { message },
        },
        Err(e) => ServerMessage::Error {
            message: format!("Unrecognized message: {e}"),
        },
    };

    match serde_json::to_string(&reply) {
        Ok(json) => {
            ws_manager
                .send_to_conn(conn_id, Message::Text(json.into()))
                .await;
        }
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to serialize ws reply");
        }
    }
}

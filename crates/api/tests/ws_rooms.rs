//! Unit tests for `WsManager` room semantics.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics,
//! idempotent room membership, room-scoped broadcast delivery, and graceful
//! shutdown behaviour.

use axum::extract::ws::Message;
use worksite_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: new manager starts empty
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections_and_empty_rooms() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.room_size(7).await, 0);
}

// ---------------------------------------------------------------------------
// Test: join is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn joining_twice_is_a_noop() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), None).await;

    assert_eq!(manager.join_room("conn-1", 7).await, 1);
    assert_eq!(manager.join_room("conn-1", 7).await, 1);
    assert_eq!(manager.room_size(7).await, 1);
}

// ---------------------------------------------------------------------------
// Test: leave when not joined is a no-op, not an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leaving_without_joining_is_a_noop() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), None).await;

    manager.leave_room("conn-1", 7).await;
    assert_eq!(manager.room_size(7).await, 0);
}

// ---------------------------------------------------------------------------
// Test: room broadcast reaches members only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_to_project_reaches_members_only() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;
    let mut rx3 = manager.add("conn-3".to_string(), None).await;

    manager.join_room("conn-1", 7).await;
    manager.join_room("conn-2", 7).await;
    manager.join_room("conn-3", 8).await;

    manager
        .broadcast_to_project(7, Message::Text("project 7 update".into()))
        .await;

    let msg1 = rx1.recv().await.expect("member 1 should receive");
    let msg2 = rx2.recv().await.expect("member 2 should receive");
    assert!(matches!(&msg1, Message::Text(t) if *t == "project 7 update"));
    assert!(matches!(&msg2, Message::Text(t) if *t == "project 7 update"));

    // conn-3 watches a different project and gets nothing.
    assert!(
        rx3.try_recv().is_err(),
        "non-member must not receive the room broadcast"
    );
}

// ---------------------------------------------------------------------------
// Test: broadcast to an empty room is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_to_empty_room_does_not_panic() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), None).await;

    manager
        .broadcast_to_project(99, Message::Text("nobody home".into()))
        .await;

    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: leaving a room stops delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leave_room_stops_delivery() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), None).await;

    manager.join_room("conn-1", 7).await;
    manager.leave_room("conn-1", 7).await;

    manager
        .broadcast_to_project(7, Message::Text("after leave".into()))
        .await;
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: removing a connection purges its room memberships
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_purges_room_membership() {
    let manager = WsManager::new();
    let _rx1 = manager.add("conn-1".to_string(), None).await;
    let _rx2 = manager.add("conn-2".to_string(), None).await;

    manager.join_room("conn-1", 7).await;
    manager.join_room("conn-2", 7).await;
    assert_eq!(manager.room_size(7).await, 2);

    manager.remove("conn-1").await;
    assert_eq!(manager.room_size(7).await, 1);
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: closed channels are skipped without panicking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let manager = WsManager::new();
    let rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;

    manager.join_room("conn-1", 7).await;
    manager.join_room("conn-2", 7).await;

    // Drop rx1 to close its channel.
    drop(rx1);

    manager
        .broadcast_to_project(7, Message::Text("still alive".into()))
        .await;

    let msg = rx2.recv().await.expect("rx2 should receive broadcast");
    assert!(matches!(&msg, Message::Text(t) if *t == "still alive"));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all sends Close and clears rooms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears_everything() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;
    manager.join_room("conn-1", 7).await;
    manager.join_room("conn-2", 7).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.room_size(7).await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(matches!(msg1, Message::Close(None)));
    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)));
}

// ---------------------------------------------------------------------------
// Test: send_to_user targets only that user's connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_user_targets_only_their_connections() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), Some(10)).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(11)).await;

    let sent = manager
        .send_to_user(10, Message::Text("for user 10".into()))
        .await;

    assert_eq!(sent, 1);
    assert!(rx1.recv().await.is_some());
    assert!(rx2.try_recv().is_err());
}

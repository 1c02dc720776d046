use std::sync::Arc;

use worksite_extractor::FieldExtractor;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The WebSocket
/// manager and event bus are constructed once in `main` and injected here;
/// no process-wide mutable handle exists anywhere.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: worksite_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection and room manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus; mutations publish here after commit.
    pub event_bus: Arc<worksite_events::EventBus>,
    /// AI field-extraction collaborator.
    pub extractor: Arc<dyn FieldExtractor>,
}

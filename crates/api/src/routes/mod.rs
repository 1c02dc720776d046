pub mod audit;
pub mod extraction;
pub mod health;
pub mod project;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (room join/leave + pushes)
///
/// /projects                            list, create
/// /projects/{id}                       get, update, delete
/// /projects/{id}/status                update status (PUT)
/// /projects/{id}/lock                  acquire (POST), release (DELETE)
/// /projects/{id}/history               change ledger page (GET)
/// /projects/{id}/status-history        status transition chain (GET)
/// /projects/{id}/extractions           list extractions (GET)
///
/// /extractions/extract                 run AI extraction on text (POST)
/// /extractions/{id}/confirm            confirm (POST)
/// /extractions/{id}/reject             reject (POST)
/// /extractions/{id}/apply              apply (POST)
/// /extractions/batch-apply             batch apply (POST)
///
/// /audit/users/{id}                    one actor's changes (GET, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Project aggregate: CRUD, status, lock, history.
        .nest("/projects", project::router())
        // Extraction review workflow.
        .nest("/extractions", extraction::router())
        // Cross-project audit.
        .nest("/audit", audit::router())
}

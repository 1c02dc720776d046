//! Route definitions for the `/projects` resource.
//!
//! All endpoints require authentication via the `AuthUser` extractor.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{extraction, history, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// PUT    /{id}/status           -> update_status
/// POST   /{id}/lock             -> acquire_lock
/// DELETE /{id}/lock             -> release_lock
/// GET    /{id}/history          -> get_project_history
/// GET    /{id}/status-history   -> get_status_history
/// GET    /{id}/extractions      -> list_by_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/status", put(project::update_status))
        .route(
            "/{id}/lock",
            post(project::acquire_lock).delete(project::release_lock),
        )
        .route("/{id}/history", get(history::get_project_history))
        .route("/{id}/status-history", get(history::get_status_history))
        .route("/{id}/extractions", get(extraction::list_by_project))
}

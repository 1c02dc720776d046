//! Route definitions for cross-project audit queries.

use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/audit`.
///
/// ```text
/// GET /users/{id}   -> get_user_changes (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}", get(history::get_user_changes))
}

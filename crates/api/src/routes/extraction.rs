//! Route definitions for the extraction review workflow.

use axum::routing::post;
use axum::Router;

use crate::handlers::extraction;
use crate::state::AppState;

/// Routes mounted at `/extractions`.
///
/// ```text
/// POST /extract          -> extract_from_text
/// POST /{id}/confirm     -> confirm
/// POST /{id}/reject      -> reject
/// POST /{id}/apply       -> apply
/// POST /batch-apply      -> batch_apply
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/extract", post(extraction::extract_from_text))
        .route("/{id}/confirm", post(extraction::confirm))
        .route("/{id}/reject", post(extraction::reject))
        .route("/{id}/apply", post(extraction::apply))
        .route("/batch-apply", post(extraction::batch_apply))
}

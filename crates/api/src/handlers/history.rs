//! Handlers for audit history: the project change ledger, the status
//! transition chain, and per-user activity.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use worksite_core::error::CoreError;
use worksite_core::roles::ROLE_ADMIN;
use worksite_core::types::DbId;
use worksite_db::models::change_log::{ChangeLogPage, ChangeLogQuery};
use worksite_db::repositories::{ChangeLogRepo, ProjectRepo, StatusHistoryRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the per-user audit listing.
#[derive(Debug, Deserialize)]
pub struct UserAuditQuery {
    pub limit: Option<i64>,
}

async fn ensure_project_exists(state: &AppState, id: DbId) -> Result<(), AppError> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// GET /api/v1/projects/{id}/history
///
/// Paginated change-log page, newest first.
pub async fn get_project_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<ChangeLogQuery>,
) -> AppResult<impl IntoResponse> {
    ensure_project_exists(&state, id).await?;

    let items = ChangeLogRepo::list_by_project(&state.pool, id, &query).await?;
    let total = ChangeLogRepo::count_by_project(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: ChangeLogPage { items, total },
    }))
}

/// GET /api/v1/projects/{id}/status-history
pub async fn get_status_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_project_exists(&state, id).await?;

    let entries = StatusHistoryRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/audit/users/{id}
///
/// One actor's ledger entries across all projects. Admin only.
pub async fn get_user_changes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(query): Query<UserAuditQuery>,
) -> AppResult<impl IntoResponse> {
    auth.require_role(&[ROLE_ADMIN])?;

    let entries = ChangeLogRepo::list_by_user(&state.pool, user_id, query.limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

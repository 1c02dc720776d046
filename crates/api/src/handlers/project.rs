//! Handlers for the `/projects` resource: CRUD, status transitions, and the
//! advisory edit lock.
//!
//! Every accepted mutation publishes a [`ProjectEvent`] after its
//! transaction commits; publication is fire-and-forget and can never fail
//! the request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use worksite_core::error::CoreError;
use worksite_core::project::ProjectStatus;
use worksite_core::roles::{ROLE_ADMIN, ROLE_SALES};
use worksite_core::types::DbId;
use worksite_core::{changelog::ChangeType, validators};
use worksite_db::models::project::{CreateProject, Project, ProjectFieldChanges, ProjectFilter};
use worksite_db::repositories::{
    LockAttempt, ProjectRepo, ReleaseAttempt, StatusOutcome, UpdateOutcome,
};
use worksite_events::bus::event_types;
use worksite_events::ProjectEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for project listing.
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub status: Option<String>,
    /// When true, only projects created by the caller.
    pub mine: Option<bool>,
}

/// Request body for a status transition.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn project_json(project: &Project) -> serde_json::Value {
    serde_json::to_value(project).unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Only sales or admin may open a new project.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    auth.require_role(&[ROLE_SALES, ROLE_ADMIN])?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let project = ProjectRepo::create(&state.pool, &input, auth.user_id).await?;

    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");
    state.event_bus.publish(
        ProjectEvent::new(event_types::PROJECT_CREATED, project.id)
            .with_actor(auth.user_id)
            .with_payload(project_json(&project)),
    );

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> AppResult<Json<Vec<Project>>> {
    if let Some(status) = &query.status {
        if ProjectStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid status value: {status}"
            ))));
        }
    }

    let filter = ProjectFilter {
        status: query.status,
        created_by: query.mine.unwrap_or(false).then_some(auth.user_id),
    };
    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}
///
/// Field update through the closed allowlist. Fails 409 when another user
/// holds the edit lock; each genuinely changed field gets one ledger entry,
/// committed atomically with the update.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(changes): Json<ProjectFieldChanges>,
) -> AppResult<Json<Project>> {
    if let Some(email) = &changes.client_email {
        if !validators::is_valid_email(email) {
            return Err(AppError::Core(CoreError::Validation(
                "client_email format is invalid".into(),
            )));
        }
    }

    let source_role = auth.role.clone();
    let outcome = ProjectRepo::update_fields(
        &state.pool,
        id,
        &changes,
        auth.user_id,
        ChangeType::Standard,
        worksite_core::roles::is_valid_source_role(&source_role).then_some(source_role.as_str()),
        None,
    )
    .await?;

    match outcome {
        UpdateOutcome::Updated { project, entries } => {
            if !entries.is_empty() {
                tracing::info!(
                    project_id = id,
                    user_id = auth.user_id,
                    fields = entries.len(),
                    "Project fields updated"
                );
                state.event_bus.publish(
                    ProjectEvent::new(event_types::PROJECT_UPDATED, id)
                        .with_actor(auth.user_id)
                        .with_payload(serde_json::json!({
                            "project": project_json(&project),
                            "changes": entries,
                        })),
                );
            }
            Ok(Json(project))
        }
        UpdateOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        })),
        UpdateOutcome::Locked {
            holder_user_id, ..
        } => Err(AppError::Core(CoreError::Conflict(format!(
            "Project is locked by user {holder_user_id}"
        )))),
    }
}

/// DELETE /api/v1/projects/{id}
///
/// Soft delete; only the creator or an admin. Deleting an already-deleted
/// project fails 404 rather than succeeding silently.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    if auth.role != ROLE_ADMIN && project.created_by_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the project owner or an admin can delete a project".into(),
        )));
    }

    let deleted = ProjectRepo::soft_delete(&state.pool, id, auth.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }

    tracing::info!(project_id = id, user_id = auth.user_id, "Project soft-deleted");
    state
        .event_bus
        .publish(ProjectEvent::new(event_types::PROJECT_DELETED, id).with_actor(auth.user_id));

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// PUT /api/v1/projects/{id}/status
///
/// Validates the six-value status enum and records the transition in both
/// the status history chain and the change ledger, atomically with the
/// project row. Deliberately available without holding the edit lock.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<Project>> {
    let new_status = ProjectStatus::parse(&input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Invalid status value: {}",
            input.status
        )))
    })?;

    match ProjectRepo::update_status(&state.pool, id, new_status, auth.user_id).await? {
        StatusOutcome::Updated { project, history } => {
            tracing::info!(
                project_id = id,
                user_id = auth.user_id,
                from = history.from_status.as_deref().unwrap_or("none"),
                to = %history.to_status,
                "Project status changed"
            );
            state.event_bus.publish(
                ProjectEvent::new(event_types::PROJECT_STATUS_CHANGED, id)
                    .with_actor(auth.user_id)
                    .with_payload(serde_json::json!({
                        "from": history.from_status,
                        "to": history.to_status,
                    })),
            );
            Ok(Json(project))
        }
        StatusOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        })),
    }
}

// ---------------------------------------------------------------------------
// Advisory edit lock
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/lock
///
/// Acquire the edit lock. Re-acquiring a lock you already hold succeeds and
/// leaves the lock state unchanged; a lock held by someone else returns 409
/// naming the holder.
pub async fn acquire_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match ProjectRepo::acquire_lock(&state.pool, id, auth.user_id).await? {
        LockAttempt::Acquired(project) => {
            tracing::info!(project_id = id, user_id = auth.user_id, "Lock acquired");
            state.event_bus.publish(
                ProjectEvent::new(event_types::PROJECT_LOCKED, id)
                    .with_actor(auth.user_id)
                    .with_payload(serde_json::json!({
                        "locked_by_user_id": project.locked_by_user_id,
                        "locked_at": project.locked_at,
                    })),
            );
            Ok(Json(DataResponse {
                data: serde_json::json!({
                    "locked": true,
                    "locked_by_user_id": project.locked_by_user_id,
                    "locked_at": project.locked_at,
                }),
            }))
        }
        LockAttempt::Held {
            holder_user_id,
            locked_at,
        } => {
            let since = locked_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            Err(AppError::Core(CoreError::Conflict(format!(
                "Project is locked by user {holder_user_id} since {since}"
            ))))
        }
        LockAttempt::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        })),
    }
}

/// DELETE /api/v1/projects/{id}/lock
///
/// Release the edit lock. Only the holder may release; anyone else gets 401
/// and the lock is left untouched.
pub async fn release_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match ProjectRepo::release_lock(&state.pool, id, auth.user_id).await? {
        ReleaseAttempt::Released => {
            tracing::info!(project_id = id, user_id = auth.user_id, "Lock released");
            state.event_bus.publish(
                ProjectEvent::new(event_types::PROJECT_UNLOCKED, id).with_actor(auth.user_id),
            );
            Ok(Json(DataResponse {
                data: serde_json::json!({ "locked": false }),
            }))
        }
        ReleaseAttempt::NotHolder => Err(AppError::Core(CoreError::Unauthorized(
            "Cannot release a lock held by another user".into(),
        ))),
        ReleaseAttempt::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        })),
    }
}

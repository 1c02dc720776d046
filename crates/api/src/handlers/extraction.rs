//! Handlers for the extraction review workflow.
//!
//! AI-suggested field values travel a staged pipeline:
//! `pending_review -> confirmed -> applied`, with `pending_review ->
//! rejected` as the other exit. Applying a confirmed extraction funnels
//! through the same aggregate-store update path as a manual edit, so it
//! inherits both the advisory lock check and the atomic ledger append.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use worksite_core::changelog::ChangeType;
use worksite_core::error::CoreError;
use worksite_core::extraction::ExtractionStatus;
use worksite_core::project::ProjectField;
use worksite_core::types::DbId;
use worksite_db::models::extraction::{CreateExtraction, Extraction};
use worksite_db::models::project::ProjectFieldChanges;
use worksite_db::repositories::{ExtractionRepo, ProjectRepo, TransitionAttempt, UpdateOutcome};
use worksite_events::bus::event_types;
use worksite_events::ProjectEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Request body for text extraction.
#[derive(Debug, Deserialize)]
pub struct ExtractFromTextRequest {
    pub project_id: DbId,
    pub text: String,
    /// Originating communication, when the text came from one.
    pub source_id: Option<DbId>,
}

/// Query parameters for listing a project's extractions.
#[derive(Debug, Deserialize)]
pub struct ListExtractionsQuery {
    pub status: Option<String>,
}

/// Request body for batch apply.
#[derive(Debug, Deserialize)]
pub struct BatchApplyRequest {
    pub extraction_ids: Vec<DbId>,
}

/// One failed id in a batch apply.
#[derive(Debug, Serialize)]
pub struct BatchApplyFailure {
    pub id: DbId,
    pub error: String,
}

/// Full report of a batch apply: every id is attempted, successes and
/// failures are reported side by side.
#[derive(Debug, Serialize)]
pub struct BatchApplyReport {
    pub applied: Vec<Extraction>,
    pub failures: Vec<BatchApplyFailure>,
}

// ---------------------------------------------------------------------------
// Extraction from text
// ---------------------------------------------------------------------------

/// POST /api/v1/extractions/extract
///
/// Run the AI extractor over raw communication text and store each valid
/// candidate as a `pending_review` extraction. Candidates naming unknown
/// fields or carrying out-of-range confidence never reach the database.
pub async fn extract_from_text(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ExtractFromTextRequest>,
) -> AppResult<impl IntoResponse> {
    if input.text.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Text is required for extraction".into(),
        )));
    }

    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }))?;

    let candidates = state.extractor.extract_fields(&input.text).await?;

    let mut extractions = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let extraction = ExtractionRepo::create(
            &state.pool,
            &CreateExtraction {
                project_id: input.project_id,
                source_id: input.source_id,
                field_name: candidate.field_name,
                extracted_value: candidate.extracted_value,
                confidence_score: candidate.confidence_score,
            },
        )
        .await?;
        extractions.push(extraction);
    }

    tracing::info!(
        project_id = input.project_id,
        user_id = auth.user_id,
        count = extractions.len(),
        "Extractions stored for review"
    );

    Ok(Json(DataResponse { data: extractions }))
}

/// GET /api/v1/projects/{id}/extractions
pub async fn list_by_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(query): Query<ListExtractionsQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &query.status {
        if ExtractionStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid extraction status: {status}"
            ))));
        }
    }

    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    let extractions =
        ExtractionRepo::list_by_project(&state.pool, project_id, query.status.as_deref()).await?;
    Ok(Json(DataResponse { data: extractions }))
}

// ---------------------------------------------------------------------------
// Review transitions
// ---------------------------------------------------------------------------

fn map_transition(attempt: TransitionAttempt, id: DbId) -> AppResult<Extraction> {
    match attempt {
        TransitionAttempt::Done(extraction) => Ok(extraction),
        TransitionAttempt::WrongState { current } => Err(AppError::Core(CoreError::Conflict(
            format!("Extraction is already {current}"),
        ))),
        TransitionAttempt::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Extraction",
            id,
        })),
    }
}

/// POST /api/v1/extractions/{id}/confirm
pub async fn confirm(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let attempt = ExtractionRepo::confirm(&state.pool, id, auth.user_id).await?;
    let extraction = map_transition(attempt, id)?;

    tracing::info!(extraction_id = id, user_id = auth.user_id, "Extraction confirmed");
    Ok(Json(DataResponse { data: extraction }))
}

/// POST /api/v1/extractions/{id}/reject
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let attempt = ExtractionRepo::reject(&state.pool, id, auth.user_id).await?;
    let extraction = map_transition(attempt, id)?;

    tracing::info!(extraction_id = id, user_id = auth.user_id, "Extraction rejected");
    Ok(Json(DataResponse { data: extraction }))
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Apply one confirmed extraction to its project.
///
/// The project update (field change + `aiExtraction` ledger entry) commits
/// atomically; only then does the extraction move `confirmed -> applied`.
async fn apply_one(state: &AppState, id: DbId, auth: &AuthUser) -> AppResult<Extraction> {
    let extraction = ExtractionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Extraction",
            id,
        }))?;

    if ExtractionStatus::parse(&extraction.status) != Some(ExtractionStatus::Confirmed) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Can only apply confirmed extractions, current status: {}",
            extraction.status
        ))));
    }

    let field = ProjectField::parse(&extraction.field_name).ok_or_else(|| {
        AppError::InternalError(format!(
            "Extraction {id} targets unknown field {}",
            extraction.field_name
        ))
    })?;

    let changes = ProjectFieldChanges::single(field, extraction.extracted_value.clone());
    let notes = format!("applied from extraction id {id}");
    let outcome = ProjectRepo::update_fields(
        &state.pool,
        extraction.project_id,
        &changes,
        auth.user_id,
        ChangeType::AiExtraction,
        None,
        Some(&notes),
    )
    .await?;

    let project = match outcome {
        UpdateOutcome::Updated { project, .. } => project,
        UpdateOutcome::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: extraction.project_id,
            }))
        }
        UpdateOutcome::Locked {
            holder_user_id, ..
        } => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Project is locked by user {holder_user_id}"
            ))))
        }
    };

    let attempt = ExtractionRepo::mark_applied(&state.pool, id, auth.user_id).await?;
    let applied = map_transition(attempt, id)?;

    state.event_bus.publish(
        ProjectEvent::new(event_types::EXTRACTION_APPLIED, extraction.project_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "extraction_id": id,
                "field_name": applied.field_name.clone(),
                "new_value": applied.extracted_value.clone(),
                "project": serde_json::to_value(&project).unwrap_or(serde_json::Value::Null),
            })),
    );

    Ok(applied)
}

/// POST /api/v1/extractions/{id}/apply
pub async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let extraction = apply_one(&state, id, &auth).await?;

    tracing::info!(extraction_id = id, user_id = auth.user_id, "Extraction applied");
    Ok(Json(DataResponse { data: extraction }))
}

/// POST /api/v1/extractions/batch-apply
///
/// Applies each id independently: a failure on one id never prevents
/// attempting the rest, and the response reports every per-id failure
/// alongside the successes.
pub async fn batch_apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BatchApplyRequest>,
) -> AppResult<impl IntoResponse> {
    if input.extraction_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "extraction_ids must not be empty".into(),
        )));
    }

    let mut report = BatchApplyReport {
        applied: Vec::new(),
        failures: Vec::new(),
    };

    for id in input.extraction_ids {
        match apply_one(&state, id, &auth).await {
            Ok(extraction) => report.applied.push(extraction),
            Err(err) => {
                tracing::warn!(extraction_id = id, error = %err, "Batch apply item failed");
                report.failures.push(BatchApplyFailure {
                    id,
                    error: failure_message(&err),
                });
            }
        }
    }

    tracing::info!(
        user_id = auth.user_id,
        applied = report.applied.len(),
        failed = report.failures.len(),
        "Batch apply finished"
    );

    Ok(Json(DataResponse { data: report }))
}

/// Per-id failure text for the batch report. Domain errors are surfaced
/// verbatim; infrastructure errors are sanitized.
fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Core(core) => core.to_string(),
        AppError::BadRequest(msg) => msg.clone(),
        _ => "internal error".to_string(),
    }
}

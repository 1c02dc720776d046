//! Repository for the `extractions` table.
//!
//! Review-state transitions are conditional updates keyed on the expected
//! current status, so two reviewers racing on the same extraction cannot
//! both win and a terminal row can never move again.

use sqlx::PgPool;
use worksite_core::extraction::ExtractionStatus;
use worksite_core::types::DbId;

use crate::models::extraction::{CreateExtraction, Extraction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, source_id, field_name, extracted_value, \
                       confidence_score, status, reviewed_by_id, extracted_at, reviewed_at";

/// Result of a review-state transition attempt.
#[derive(Debug)]
pub enum TransitionAttempt {
    /// The transition committed.
    Done(Extraction),
    /// The extraction exists but is not in the state the transition
    /// requires; `current` is its observed status, left untouched.
    WrongState { current: String },
    NotFound,
}

/// Provides CRUD and review-transition operations for extractions.
pub struct ExtractionRepo;

impl ExtractionRepo {
    /// Insert a new candidate in `pending_review` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreateExtraction,
    ) -> Result<Extraction, sqlx::Error> {
        let query = format!(
            "INSERT INTO extractions (project_id, source_id, field_name, extracted_value, confidence_score)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Extraction>(&query)
            .bind(input.project_id)
            .bind(input.source_id)
            .bind(&input.field_name)
            .bind(&input.extracted_value)
            .bind(input.confidence_score)
            .fetch_one(pool)
            .await
    }

    /// Find an extraction by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Extraction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM extractions WHERE id = $1");
        sqlx::query_as::<_, Extraction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's extractions, newest first, optionally filtered by
    /// review status.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<Extraction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM extractions
             WHERE project_id = $1
               AND ($2::text IS NULL OR status = $2)
             ORDER BY extracted_at DESC, id DESC"
        );
        sqlx::query_as::<_, Extraction>(&query)
            .bind(project_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// List extractions produced from one source communication.
    pub async fn list_by_source(
        pool: &PgPool,
        source_id: DbId,
    ) -> Result<Vec<Extraction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM extractions
             WHERE source_id = $1
             ORDER BY field_name ASC"
        );
        sqlx::query_as::<_, Extraction>(&query)
            .bind(source_id)
            .fetch_all(pool)
            .await
    }

    /// Move `pending_review -> confirmed`, stamping the reviewer.
    pub async fn confirm(
        pool: &PgPool,
        id: DbId,
        reviewed_by_id: DbId,
    ) -> Result<TransitionAttempt, sqlx::Error> {
        Self::transition(
            pool,
            id,
            ExtractionStatus::PendingReview,
            ExtractionStatus::Confirmed,
            reviewed_by_id,
        )
        .await
    }

    /// Move `pending_review -> rejected`, stamping the reviewer.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reviewed_by_id: DbId,
    ) -> Result<TransitionAttempt, sqlx::Error> {
        Self::transition(
            pool,
            id,
            ExtractionStatus::PendingReview,
            ExtractionStatus::Rejected,
            reviewed_by_id,
        )
        .await
    }

    /// Move `confirmed -> applied` after the project update committed.
    pub async fn mark_applied(
        pool: &PgPool,
        id: DbId,
        reviewed_by_id: DbId,
    ) -> Result<TransitionAttempt, sqlx::Error> {
        Self::transition(
            pool,
            id,
            ExtractionStatus::Confirmed,
            ExtractionStatus::Applied,
            reviewed_by_id,
        )
        .await
    }

    /// Conditional-update transition: succeeds only when the row is in
    /// `from`. Zero rows affected means the row is missing or in another
    /// state; a follow-up read distinguishes the two.
    async fn transition(
        pool: &PgPool,
        id: DbId,
        from: ExtractionStatus,
        to: ExtractionStatus,
        reviewed_by_id: DbId,
    ) -> Result<TransitionAttempt, sqlx::Error> {
        let query = format!(
            "UPDATE extractions
             SET status = $3, reviewed_by_id = $4, reviewed_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Extraction>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(reviewed_by_id)
            .fetch_optional(pool)
            .await?;

        if let Some(extraction) = updated {
            return Ok(TransitionAttempt::Done(extraction));
        }

        match Self::find_by_id(pool, id).await? {
            Some(extraction) => Ok(TransitionAttempt::WrongState {
                current: extraction.status,
            }),
            None => Ok(TransitionAttempt::NotFound),
        }
    }
}

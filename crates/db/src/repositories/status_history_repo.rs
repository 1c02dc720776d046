//! Repository for the `status_history` table.
//!
//! Append-only, written exclusively by `ProjectRepo::update_status` inside
//! the status transaction. Exposed reads serve the project timeline view.

use sqlx::PgPool;
use worksite_core::types::DbId;

use crate::models::status_history::StatusHistoryEntry;

/// Column list shared across queries.
const COLUMNS: &str = "id, project_id, from_status, to_status, changed_by_id, created_at";

/// Provides append and read operations for status transitions.
pub struct StatusHistoryRepo;

impl StatusHistoryRepo {
    /// Append one transition row, returning the created entry.
    pub async fn append(
        executor: impl sqlx::PgExecutor<'_>,
        project_id: DbId,
        from_status: Option<&str>,
        to_status: &str,
        changed_by_id: DbId,
    ) -> Result<StatusHistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO status_history (project_id, from_status, to_status, changed_by_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(project_id)
            .bind(from_status)
            .bind(to_status)
            .bind(changed_by_id)
            .fetch_one(executor)
            .await
    }

    /// List all transitions for a project, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM status_history
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent transition for a project, if any.
    pub async fn latest_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<StatusHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM status_history
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}

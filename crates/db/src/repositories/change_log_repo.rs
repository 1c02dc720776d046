//! Repository for the `change_logs` table.
//!
//! Strictly append-only: this repository exposes insert and read methods
//! and nothing else. Appends take a generic executor so the project
//! repository can write ledger entries inside the same transaction as the
//! field update they record.

use sqlx::PgPool;
use worksite_core::types::DbId;

use crate::models::change_log::{ChangeLogEntry, ChangeLogQuery, CreateChangeLog};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, changed_by_id, change_type, field_name, \
                       old_value, new_value, source_role, notes, created_at";

/// Default page size for history queries.
const DEFAULT_LIMIT: i64 = 50;

/// Provides append and read operations for the change ledger.
pub struct ChangeLogRepo;

impl ChangeLogRepo {
    /// Append a new entry, returning the created row.
    ///
    /// `created_at` is assigned server-side. The executor parameter lets
    /// callers append within an open transaction.
    pub async fn append(
        executor: impl sqlx::PgExecutor<'_>,
        input: &CreateChangeLog,
    ) -> Result<ChangeLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_logs
                (project_id, changed_by_id, change_type, field_name, old_value, new_value, source_role, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeLogEntry>(&query)
            .bind(input.project_id)
            .bind(input.changed_by_id)
            .bind(input.change_type.as_str())
            .bind(&input.field_name)
            .bind(&input.old_value)
            .bind(&input.new_value)
            .bind(&input.source_role)
            .bind(&input.notes)
            .fetch_one(executor)
            .await
    }

    /// List entries for a project, newest first.
    ///
    /// Ordering is stable: `created_at` descending with ties broken by id
    /// descending, so two entries committed in the same transaction keep
    /// their insertion order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        query_params: &ChangeLogQuery,
    ) -> Result<Vec<ChangeLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM change_logs
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ChangeLogEntry>(&query)
            .bind(project_id)
            .bind(query_params.limit.unwrap_or(DEFAULT_LIMIT))
            .bind(query_params.offset.unwrap_or(0))
            .fetch_all(pool)
            .await
    }

    /// Total number of entries for a project, for pagination.
    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM change_logs WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// List one actor's entries across all projects, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<ChangeLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM change_logs
             WHERE changed_by_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ChangeLogEntry>(&query)
            .bind(user_id)
            .bind(limit.unwrap_or(DEFAULT_LIMIT))
            .fetch_all(pool)
            .await
    }
}

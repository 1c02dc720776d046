//! Repository for the `projects` table: the aggregate store.
//!
//! Everything that mutates a project goes through this repository, which
//! enforces the two rules the rest of the system relies on:
//!
//! 1. Field updates check the advisory lock and commit the field change
//!    together with its change-log entries as one transaction. A mutation
//!    is never applied without its ledger entries, and vice versa.
//! 2. Lock acquire/release are single conditional updates (compare-and-set
//!    on `locked_by_user_id`), so two concurrent acquires for the same
//!    project cannot both succeed.
//!
//! Business outcomes (not found, locked by another user) are returned as
//! tagged enums; `sqlx::Error` is reserved for infrastructure failures.

use sqlx::PgPool;
use worksite_core::changelog::ChangeType;
use worksite_core::project::{ProjectField, ProjectStatus, ALL_FIELDS};
use worksite_core::types::{DbId, Timestamp};

use crate::models::change_log::{ChangeLogEntry, CreateChangeLog};
use crate::models::project::{CreateProject, Project, ProjectFieldChanges, ProjectFilter};
use crate::models::status_history::StatusHistoryEntry;
use crate::repositories::{ChangeLogRepo, StatusHistoryRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, status, client_name, client_email, client_phone, \
                       project_address, start_date, budget, special_requirements, \
                       locked_by_user_id, locked_at, created_by_id, deleted_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Result of a lock acquisition attempt.
#[derive(Debug)]
pub enum LockAttempt {
    /// The caller now holds (or already held) the lock.
    Acquired(Project),
    /// Another user holds the lock; the fields identify the holder so the
    /// caller can surface a useful conflict message.
    Held {
        holder_user_id: DbId,
        locked_at: Option<Timestamp>,
    },
    /// No live project with that id.
    NotFound,
}

/// Result of a lock release attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum ReleaseAttempt {
    Released,
    /// The caller is not the current holder; the lock was left untouched.
    NotHolder,
    NotFound,
}

/// Result of a field update.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The update committed; `entries` holds one ledger row per field whose
    /// value actually changed (possibly empty if every submitted value
    /// matched the stored one).
    Updated {
        project: Project,
        entries: Vec<ChangeLogEntry>,
    },
    NotFound,
    /// The project is locked by a different user; nothing was applied.
    Locked {
        holder_user_id: DbId,
        locked_at: Option<Timestamp>,
    },
}

/// Result of a status transition.
#[derive(Debug)]
pub enum StatusOutcome {
    Updated {
        project: Project,
        history: StatusHistoryEntry,
    },
    NotFound,
}

// ---------------------------------------------------------------------------
// ProjectRepo
// ---------------------------------------------------------------------------

/// Provides aggregate-store operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `draft` status, recording a creation entry
    /// in the change ledger within the same transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        created_by_id: DbId,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (name, description, status, client_name, client_email, client_phone, created_by_id)
             VALUES ($1, $2, 'draft', $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.client_phone)
            .bind(created_by_id)
            .fetch_one(&mut *tx)
            .await?;

        ChangeLogRepo::append(
            &mut *tx,
            &CreateChangeLog {
                project_id: project.id,
                changed_by_id: created_by_id,
                change_type: ChangeType::Standard,
                field_name: Some("name".to_string()),
                old_value: None,
                new_value: Some(project.name.clone()),
                source_role: None,
                notes: Some("project created".to_string()),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by its ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, newest first, optionally filtered by status and/or
    /// creator. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR created_by_id = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&filter.status)
            .bind(filter.created_by)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Advisory lock
    // -----------------------------------------------------------------------

    /// Attempt to acquire the edit lock.
    ///
    /// A single conditional UPDATE succeeds when the project is unlocked or
    /// already locked by the caller (idempotent re-acquire: COALESCE keeps
    /// the original `locked_at`, so repeating the call yields the identical
    /// lock state). Zero rows affected means either the project is missing
    /// or another user holds the lock; a follow-up read distinguishes the
    /// two and exposes the holder for the conflict response.
    pub async fn acquire_lock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<LockAttempt, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET locked_by_user_id = $2, locked_at = COALESCE(locked_at, NOW())
             WHERE id = $1 AND deleted_at IS NULL
               AND (locked_by_user_id IS NULL OR locked_by_user_id = $2)
             RETURNING {COLUMNS}"
        );

        loop {
            let acquired = sqlx::query_as::<_, Project>(&query)
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

            if let Some(project) = acquired {
                return Ok(LockAttempt::Acquired(project));
            }

            match Self::find_by_id(pool, id).await? {
                Some(project) => match project.locked_by_user_id {
                    Some(holder) => {
                        return Ok(LockAttempt::Held {
                            holder_user_id: holder,
                            locked_at: project.locked_at,
                        })
                    }
                    // The holder released between our two statements; the
                    // project is free again, so retry the conditional update.
                    None => continue,
                },
                None => return Ok(LockAttempt::NotFound),
            }
        }
    }

    /// Release the edit lock. Only the current holder may release; anyone
    /// else leaves the lock untouched and gets [`ReleaseAttempt::NotHolder`].
    pub async fn release_lock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<ReleaseAttempt, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET locked_by_user_id = NULL, locked_at = NULL
             WHERE id = $1 AND locked_by_user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(ReleaseAttempt::Released);
        }

        match Self::find_by_id(pool, id).await? {
            Some(_) => Ok(ReleaseAttempt::NotHolder),
            None => Ok(ReleaseAttempt::NotFound),
        }
    }

    // -----------------------------------------------------------------------
    // Field updates
    // -----------------------------------------------------------------------

    /// Apply a validated field change set.
    ///
    /// One transaction: the row is locked with `SELECT ... FOR UPDATE`, the
    /// advisory lock is checked, each submitted field is diffed against the
    /// stored value, and the field update plus one ledger entry per changed
    /// field commit atomically. Submitted-but-unchanged fields produce no
    /// ledger entry.
    ///
    /// `change_type` is `Standard` for user edits and `AiExtraction` when
    /// the extraction workflow applies a confirmed candidate.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        changes: &ProjectFieldChanges,
        acting_user_id: DbId,
        change_type: ChangeType,
        source_role: Option<&str>,
        notes: Option<&str>,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Project>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let Some(holder) = current.locked_by_user_id {
            if holder != acting_user_id {
                return Ok(UpdateOutcome::Locked {
                    holder_user_id: holder,
                    locked_at: current.locked_at,
                });
            }
        }

        // Exhaustive diff over the closed field set.
        let changed: Vec<(ProjectField, Option<String>, String)> = ALL_FIELDS
            .iter()
            .filter_map(|field| {
                let submitted = changes.get(*field)?;
                let stored = current.field_value(*field);
                if stored == Some(submitted) {
                    None
                } else {
                    Some((
                        *field,
                        stored.map(str::to_string),
                        submitted.to_string(),
                    ))
                }
            })
            .collect();

        if changed.is_empty() {
            tx.commit().await?;
            return Ok(UpdateOutcome::Updated {
                project: current,
                entries: Vec::new(),
            });
        }

        let update = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                client_name = COALESCE($4, client_name),
                client_email = COALESCE($5, client_email),
                client_phone = COALESCE($6, client_phone),
                project_address = COALESCE($7, project_address),
                start_date = COALESCE($8, start_date),
                budget = COALESCE($9, budget),
                special_requirements = COALESCE($10, special_requirements),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&update)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.client_name)
            .bind(&changes.client_email)
            .bind(&changes.client_phone)
            .bind(&changes.project_address)
            .bind(&changes.start_date)
            .bind(&changes.budget)
            .bind(&changes.special_requirements)
            .fetch_one(&mut *tx)
            .await?;

        let mut entries = Vec::with_capacity(changed.len());
        for (field, old_value, new_value) in changed {
            let entry = ChangeLogRepo::append(
                &mut *tx,
                &CreateChangeLog {
                    project_id: id,
                    changed_by_id: acting_user_id,
                    change_type,
                    field_name: Some(field.column().to_string()),
                    old_value,
                    new_value: Some(new_value),
                    source_role: source_role.map(str::to_string),
                    notes: notes.map(str::to_string),
                },
            )
            .await?;
            entries.push(entry);
        }

        tx.commit().await?;
        Ok(UpdateOutcome::Updated { project, entries })
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    /// Transition a project to a new status.
    ///
    /// Writes the project row, one status-history entry, and one
    /// `statusChange` ledger entry in a single transaction. Any status may
    /// move to any other.
    ///
    /// Status transitions deliberately do not check the advisory lock:
    /// moving a project through the workflow is a cross-role action
    /// available while someone else edits fields.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        new_status: ProjectStatus,
        acting_user_id: DbId,
    ) -> Result<StatusOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Project>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(StatusOutcome::NotFound);
        };

        let update = format!(
            "UPDATE projects SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&update)
            .bind(id)
            .bind(new_status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let history = StatusHistoryRepo::append(
            &mut *tx,
            id,
            Some(current.status.as_str()),
            new_status.as_str(),
            acting_user_id,
        )
        .await?;

        ChangeLogRepo::append(
            &mut *tx,
            &CreateChangeLog {
                project_id: id,
                changed_by_id: acting_user_id,
                change_type: ChangeType::StatusChange,
                field_name: Some("status".to_string()),
                old_value: Some(current.status),
                new_value: Some(new_status.as_str().to_string()),
                source_role: None,
                notes: None,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(StatusOutcome::Updated { project, history })
    }

    // -----------------------------------------------------------------------
    // Soft delete
    // -----------------------------------------------------------------------

    /// Soft-delete a project, recording the deletion in the ledger within
    /// the same transaction.
    ///
    /// Returns `false` when the project is missing or already deleted, so
    /// deleting twice surfaces as NotFound instead of succeeding silently.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        acting_user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        ChangeLogRepo::append(
            &mut *tx,
            &CreateChangeLog {
                project_id: id,
                changed_by_id: acting_user_id,
                change_type: ChangeType::Standard,
                field_name: None,
                old_value: None,
                new_value: None,
                source_role: None,
                notes: Some("project deleted".to_string()),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

//! Change-log entity models and DTOs.
//!
//! The change log is the append-only audit trail of field-level mutations.
//! Entries have no `updated_at` field (immutable records) and no repository
//! method ever updates or deletes one.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use worksite_core::changelog::ChangeType;
use worksite_core::types::{DbId, Timestamp};

/// A single change-log entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeLogEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub changed_by_id: DbId,
    pub change_type: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub source_role: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a new change-log entry.
///
/// `change_type` is the closed [`ChangeType`] enum: a caller cannot even
/// construct an entry with a kind outside the four enumerated values, and
/// the database CHECK constraint backstops the invariant.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChangeLog {
    pub project_id: DbId,
    pub changed_by_id: DbId,
    pub change_type: ChangeType,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub source_role: Option<String>,
    pub notes: Option<String>,
}

/// Pagination parameters for change-log queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeLogQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated response for project history queries.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeLogPage {
    pub items: Vec<ChangeLogEntry>,
    pub total: i64,
}

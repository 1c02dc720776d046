//! Status history entity model.
//!
//! One row per accepted status transition. `from_status` is null only for
//! the very first transition of a project; afterwards each entry's
//! `from_status` equals the previous entry's `to_status` (append-only
//! chain). Written exclusively by the project repository inside the same
//! transaction as the status update and its change-log entry.

use serde::Serialize;
use sqlx::FromRow;
use worksite_core::types::{DbId, Timestamp};

/// A row from the `status_history` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusHistoryEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by_id: DbId,
    pub created_at: Timestamp,
}

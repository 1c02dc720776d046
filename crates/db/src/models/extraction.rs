//! Extraction entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use worksite_core::types::{DbId, Timestamp};

/// A row from the `extractions` table: one AI-suggested value for one
/// project field, awaiting (or past) human review.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Extraction {
    pub id: DbId,
    pub project_id: DbId,
    /// Originating communication, when the text came from one. Manual text
    /// extractions leave this null.
    pub source_id: Option<DbId>,
    pub field_name: String,
    pub extracted_value: String,
    pub confidence_score: f64,
    pub status: String,
    pub reviewed_by_id: Option<DbId>,
    pub extracted_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
}

/// DTO for storing a new extraction candidate.
///
/// Confidence and field name are validated before this is built (the
/// extractor client drops invalid candidates); the table CHECK constraints
/// are the backstop.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExtraction {
    pub project_id: DbId,
    pub source_id: Option<DbId>,
    pub field_name: String,
    pub extracted_value: String,
    pub confidence_score: f64,
}

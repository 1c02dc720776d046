//! Extraction review state machine and the extractable-field allowlist.
//!
//! This module lives in `core` (zero internal deps) so the repository layer,
//! HTTP handlers, and the extractor client all agree on which transitions
//! are legal and which fields the AI may ever suggest.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Extractable fields
// ---------------------------------------------------------------------------

/// Project fields the extraction service is allowed to suggest values for.
///
/// Candidates naming any other field are dropped before storage; the
/// `ck_extractions_field` CHECK constraint backstops this list.
pub const EXTRACTABLE_FIELDS: &[&str] = &[
    "client_name",
    "project_address",
    "start_date",
    "budget",
    "special_requirements",
];

/// Returns `true` if the extraction service may target this field.
pub fn is_extractable_field(field_name: &str) -> bool {
    EXTRACTABLE_FIELDS.contains(&field_name)
}

/// Validate a confidence score. Returns `Ok(())` or an error message.
pub fn validate_confidence(score: f64) -> Result<(), String> {
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(format!(
            "confidence_score must be between 0 and 1, got {score}"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ExtractionStatus
// ---------------------------------------------------------------------------

/// Review state of an extraction.
///
/// Transitions are monotone: `pending_review` may move to `confirmed` or
/// `rejected`; `confirmed` may move to `applied`; `rejected` and `applied`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    PendingReview,
    Confirmed,
    Rejected,
    Applied,
}

impl ExtractionStatus {
    /// The database representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStatus::PendingReview => "pending_review",
            ExtractionStatus::Confirmed => "confirmed",
            ExtractionStatus::Rejected => "rejected",
            ExtractionStatus::Applied => "applied",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_review" => Some(ExtractionStatus::PendingReview),
            "confirmed" => Some(ExtractionStatus::Confirmed),
            "rejected" => Some(ExtractionStatus::Rejected),
            "applied" => Some(ExtractionStatus::Applied),
            _ => None,
        }
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExtractionStatus::Rejected | ExtractionStatus::Applied)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(self, to: ExtractionStatus) -> bool {
        matches!(
            (self, to),
            (ExtractionStatus::PendingReview, ExtractionStatus::Confirmed)
                | (ExtractionStatus::PendingReview, ExtractionStatus::Rejected)
                | (ExtractionStatus::Confirmed, ExtractionStatus::Applied)
        )
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

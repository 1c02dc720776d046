//! AI field-extraction collaborator.
//!
//! The rest of the system only cares about a narrow contract: given raw
//! text, produce candidate `{field_name, extracted_value, confidence_score}`
//! triples with the field drawn from the project allowlist and the
//! confidence in [0, 1]. How extraction happens is this crate's private
//! business; [`client::LlmExtractor`] is the production implementation and
//! tests substitute their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use worksite_core::extraction::{is_extractable_field, validate_confidence};

pub mod client;

pub use client::{ExtractorConfig, LlmExtractor};

/// One candidate value suggested by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub field_name: String,
    pub extracted_value: String,
    pub confidence_score: f64,
}

impl ExtractedField {
    /// `true` when the candidate satisfies the contract: an allowlisted
    /// field name and an in-range confidence score.
    pub fn is_valid(&self) -> bool {
        is_extractable_field(&self.field_name)
            && validate_confidence(self.confidence_score).is_ok()
    }
}

/// Errors from the extraction service.
#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("extraction service rate limit exceeded")]
    RateLimited,

    #[error("extraction service error: {0}")]
    Service(String),

    #[error("failed to reach extraction service: {0}")]
    Http(String),

    #[error("extraction service returned an unparseable response: {0}")]
    InvalidResponse(String),
}

/// The seam between the review workflow and whatever produces candidates.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extract candidate field values from raw communication text.
    ///
    /// Implementations must only return candidates that pass
    /// [`ExtractedField::is_valid`]; callers may rely on that and skip
    /// re-validation.
    async fn extract_fields(&self, text: &str) -> Result<Vec<ExtractedField>, ExtractorError>;
}

/// Drop candidates that violate the contract, keeping the rest.
///
/// Shared by implementations so a misbehaving model response degrades to
/// fewer candidates instead of an error.
pub fn filter_valid(candidates: Vec<ExtractedField>) -> Vec<ExtractedField> {
    candidates.into_iter().filter(|c| c.is_valid()).collect()
}

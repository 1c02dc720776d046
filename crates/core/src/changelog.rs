//! Change-log entry kinds.

use serde::{Deserialize, Serialize};

/// The kind of a change-log entry.
///
/// Serialized with the camelCase wire names the ledger has always used
/// (`standard`, `statusChange`, `aiExtraction`, `note`); the database CHECK
/// constraint on `change_logs.change_type` lists the same four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "statusChange")]
    StatusChange,
    #[serde(rename = "aiExtraction")]
    AiExtraction,
    #[serde(rename = "note")]
    Note,
}

impl ChangeType {
    /// The database representation of this change type.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Standard => "standard",
            ChangeType::StatusChange => "statusChange",
            ChangeType::AiExtraction => "aiExtraction",
            ChangeType::Note => "note",
        }
    }

    /// Parse a stored change-type string. Returns `None` outside the four
    /// enumerated kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(ChangeType::Standard),
            "statusChange" => Some(ChangeType::StatusChange),
            "aiExtraction" => Some(ChangeType::AiExtraction),
            "note" => Some(ChangeType::Note),
            _ => None,
        }
    }
}

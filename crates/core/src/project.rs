//! Project status lifecycle and the closed set of mutable project fields.
//!
//! Both enums exist so that status transitions and field diffing are
//! exhaustive at the type level instead of driven by loosely-typed strings
//! or key/value maps.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Project lifecycle status, stored as TEXT in the `projects.status` column.
///
/// Any status may transition to any other: there is no terminal state and no
/// enforced transition graph. That permissiveness is a policy choice of the
/// workflow (a cancelled job can be revived, a completed one re-opened), not
/// an omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Quoted,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// All statuses, in workflow order.
pub const ALL_STATUSES: &[ProjectStatus] = &[
    ProjectStatus::Draft,
    ProjectStatus::Quoted,
    ProjectStatus::Scheduled,
    ProjectStatus::InProgress,
    ProjectStatus::Completed,
    ProjectStatus::Cancelled,
];

impl ProjectStatus {
    /// The database representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Quoted => "quoted",
            ProjectStatus::Scheduled => "scheduled",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a database/API status string. Returns `None` for anything
    /// outside the six-value set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ProjectStatus::Draft),
            "quoted" => Some(ProjectStatus::Quoted),
            "scheduled" => Some(ProjectStatus::Scheduled),
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "cancelled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProjectField
// ---------------------------------------------------------------------------

/// The closed set of project fields mutable through the field-update path.
///
/// Status is deliberately absent: status changes go through the dedicated
/// transition operation, which also writes the status history chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectField {
    Name,
    Description,
    ClientName,
    ClientEmail,
    ClientPhone,
    ProjectAddress,
    StartDate,
    Budget,
    SpecialRequirements,
}

/// Every mutable field, in column order.
pub const ALL_FIELDS: &[ProjectField] = &[
    ProjectField::Name,
    ProjectField::Description,
    ProjectField::ClientName,
    ProjectField::ClientEmail,
    ProjectField::ClientPhone,
    ProjectField::ProjectAddress,
    ProjectField::StartDate,
    ProjectField::Budget,
    ProjectField::SpecialRequirements,
];

impl ProjectField {
    /// The column name in the `projects` table, doubling as the
    /// `field_name` recorded in change-log entries.
    pub fn column(self) -> &'static str {
        match self {
            ProjectField::Name => "name",
            ProjectField::Description => "description",
            ProjectField::ClientName => "client_name",
            ProjectField::ClientEmail => "client_email",
            ProjectField::ClientPhone => "client_phone",
            ProjectField::ProjectAddress => "project_address",
            ProjectField::StartDate => "start_date",
            ProjectField::Budget => "budget",
            ProjectField::SpecialRequirements => "special_requirements",
        }
    }

    /// Parse a column/field name string. Returns `None` for unknown fields.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_FIELDS.iter().copied().find(|f| f.column() == s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in ALL_STATUSES {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(*status));
        }
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert_eq!(ProjectStatus::parse(""), None);
        assert_eq!(ProjectStatus::parse("archived"), None);
        assert_eq!(ProjectStatus::parse("Draft"), None);
        assert_eq!(ProjectStatus::parse("in progress"), None);
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let back: ProjectStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProjectStatus::InProgress);
    }

    #[test]
    fn field_round_trips_through_columns() {
        for field in ALL_FIELDS {
            assert_eq!(ProjectField::parse(field.column()), Some(*field));
        }
    }

    #[test]
    fn field_rejects_unknown_and_status() {
        assert_eq!(ProjectField::parse("status"), None);
        assert_eq!(ProjectField::parse("locked_by_user_id"), None);
        assert_eq!(ProjectField::parse(""), None);
    }
}

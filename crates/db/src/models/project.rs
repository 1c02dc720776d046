//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use worksite_core::project::{ProjectField, ALL_FIELDS};
use worksite_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
///
/// `locked_by_user_id` and `locked_at` are either both null (unlocked) or
/// both set (locked); the `ck_projects_lock_pair` constraint enforces this.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub project_address: Option<String>,
    pub start_date: Option<String>,
    pub budget: Option<String>,
    pub special_requirements: Option<String>,
    pub locked_by_user_id: Option<DbId>,
    pub locked_at: Option<Timestamp>,
    pub created_by_id: DbId,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Current value of a mutable field, as stored.
    pub fn field_value(&self, field: ProjectField) -> Option<&str> {
        match field {
            ProjectField::Name => Some(self.name.as_str()),
            ProjectField::Description => self.description.as_deref(),
            ProjectField::ClientName => Some(self.client_name.as_str()),
            ProjectField::ClientEmail => Some(self.client_email.as_str()),
            ProjectField::ClientPhone => self.client_phone.as_deref(),
            ProjectField::ProjectAddress => self.project_address.as_deref(),
            ProjectField::StartDate => self.start_date.as_deref(),
            ProjectField::Budget => self.budget.as_deref(),
            ProjectField::SpecialRequirements => self.special_requirements.as_deref(),
        }
    }
}

/// DTO for creating a new project. Status is always `draft` on creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "client_name cannot be empty"))]
    pub client_name: String,
    #[validate(email(message = "client_email format is invalid"))]
    pub client_email: String,
    pub client_phone: Option<String>,
}

/// DTO for the field-update operation.
///
/// One optional slot per mutable field: an omitted field is untouched, a
/// submitted field is diffed against the stored value and logged only when
/// it actually changed. This is the closed allowlist counterpart of a
/// free-form key/value patch body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFieldChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub project_address: Option<String>,
    pub start_date: Option<String>,
    pub budget: Option<String>,
    pub special_requirements: Option<String>,
}

impl ProjectFieldChanges {
    /// The submitted value for a field, if any.
    pub fn get(&self, field: ProjectField) -> Option<&str> {
        match field {
            ProjectField::Name => self.name.as_deref(),
            ProjectField::Description => self.description.as_deref(),
            ProjectField::ClientName => self.client_name.as_deref(),
            ProjectField::ClientEmail => self.client_email.as_deref(),
            ProjectField::ClientPhone => self.client_phone.as_deref(),
            ProjectField::ProjectAddress => self.project_address.as_deref(),
            ProjectField::StartDate => self.start_date.as_deref(),
            ProjectField::Budget => self.budget.as_deref(),
            ProjectField::SpecialRequirements => self.special_requirements.as_deref(),
        }
    }

    /// `true` when no field was submitted at all.
    pub fn is_empty(&self) -> bool {
        ALL_FIELDS.iter().all(|f| self.get(*f).is_none())
    }

    /// A change set targeting exactly one field. Used by the extraction
    /// apply path.
    pub fn single(field: ProjectField, value: impl Into<String>) -> Self {
        let mut changes = Self::default();
        let value = value.into();
        match field {
            ProjectField::Name => changes.name = Some(value),
            ProjectField::Description => changes.description = Some(value),
            ProjectField::ClientName => changes.client_name = Some(value),
            ProjectField::ClientEmail => changes.client_email = Some(value),
            ProjectField::ClientPhone => changes.client_phone = Some(value),
            ProjectField::ProjectAddress => changes.project_address = Some(value),
            ProjectField::StartDate => changes.start_date = Some(value),
            ProjectField::Budget => changes.budget = Some(value),
            ProjectField::SpecialRequirements => changes.special_requirements = Some(value),
        }
        changes
    }
}

/// Filter parameters for listing projects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub created_by: Option<DbId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sets_exactly_one_field() {
        let changes = ProjectFieldChanges::single(ProjectField::Budget, "12500");
        assert_eq!(changes.get(ProjectField::Budget), Some("12500"));
        for field in ALL_FIELDS.iter().filter(|f| **f != ProjectField::Budget) {
            assert_eq!(changes.get(*field), None);
        }
    }

    #[test]
    fn default_change_set_is_empty() {
        assert!(ProjectFieldChanges::default().is_empty());
        assert!(!ProjectFieldChanges::single(ProjectField::Name, "x").is_empty());
    }
}

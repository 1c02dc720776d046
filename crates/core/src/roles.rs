//! Well-known role name constants.
//!
//! These must match the `ck_users_role` CHECK constraint in
//! `20260715000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SALES: &str = "sales";
pub const ROLE_SCHEDULER: &str = "scheduler";
pub const ROLE_PRODUCTION: &str = "production";
pub const ROLE_INSTALLER: &str = "installer";

/// Roles that may appear as the `source_role` of a change-log entry.
pub const VALID_SOURCE_ROLES: &[&str] = &[
    ROLE_SALES,
    ROLE_SCHEDULER,
    ROLE_PRODUCTION,
    ROLE_INSTALLER,
];

/// Returns `true` if the given role can be recorded as a change source.
pub fn is_valid_source_role(role: &str) -> bool {
    VALID_SOURCE_ROLES.contains(&role)
}

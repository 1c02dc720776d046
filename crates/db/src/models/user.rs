//! User entity model and DTOs.
//!
//! Users exist so that every mutation, lock, and review carries an actor
//! foreign key and a role. Credentials live with the external identity
//! provider, never here.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use worksite_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    /// Defaults to `sales` if omitted.
    pub role: Option<String>,
}

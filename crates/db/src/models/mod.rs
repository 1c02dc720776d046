//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Query/update DTOs where the entity supports them

pub mod change_log;
pub mod extraction;
pub mod project;
pub mod status_history;
pub mod user;

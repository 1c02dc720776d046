//! Worksite domain layer.
//!
//! Zero-internal-dep crate holding the types every other layer agrees on:
//! id/time aliases, the error taxonomy, the closed enums for project status,
//! change types, extraction states and mutable project fields, role names,
//! the realtime room protocol, and input validators.

pub mod changelog;
pub mod error;
pub mod extraction;
pub mod project;
pub mod realtime;
pub mod roles;
pub mod types;
pub mod validators;

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an executor, where the call must participate in an
//! enclosing transaction) as the first argument. Operations with business
//! outcomes return tagged outcome enums rather than sentinel values.

pub mod change_log_repo;
pub mod extraction_repo;
pub mod project_repo;
pub mod status_history_repo;
pub mod user_repo;

pub use change_log_repo::ChangeLogRepo;
pub use extraction_repo::{ExtractionRepo, TransitionAttempt};
pub use project_repo::{LockAttempt, ProjectRepo, ReleaseAttempt, StatusOutcome, UpdateOutcome};
pub use status_history_repo::StatusHistoryRepo;
pub use user_repo::UserRepo;

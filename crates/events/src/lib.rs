//! Worksite event bus.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ProjectEvent`] — the canonical project-scoped event envelope.
//!
//! Publishing is fire-and-forget: the write path emits an event after its
//! transaction commits and never learns whether anyone was listening.
//! Realtime fan-out subscribes on the other side.

pub mod bus;

pub use bus::{EventBus, ProjectEvent};

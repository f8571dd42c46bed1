//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`backend`] - [`RecordingBackend`](backend::RecordingBackend), a scriptable
//!   [`ExecutionBackend`](crate::port::ExecutionBackend) that records calls.
//! - [`fleet`] - Canonical fleet requests for tests.

pub mod backend;
pub mod fleet;

//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  (fleet orchestrator)   │
//!                    │    Domain + Port        │
//!                    └─────────────────────────┘
//!                                │
//!                                ▼
//!                      ┌───────────────────┐
//!                      │ Execution Backend │
//!                      │ (Docker adapter)  │
//!                      └───────────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ExecutionBackend`] - Image build and isolated instance lifecycle

pub mod outbound;

pub use outbound::backend::{ExecutionBackend, SharedBackend};

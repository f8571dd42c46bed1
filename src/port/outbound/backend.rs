//! Execution backend port.
//!
//! The orchestrator drives isolated execution environments through this
//! trait and never talks to a container engine directly.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ExecutionHandle, RunSpec};
use crate::error::BackendError;

/// Lifecycle client for isolated execution environments.
///
/// One client is shared by every device task, so implementations must accept
/// concurrent `run`/`stop`/`remove` calls against distinct handles. Every
/// operation is independently fallible; callers log failures and never retry.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Build the image every instance is started from.
    ///
    /// Called exactly once per fleet run, before any `run`.
    async fn build_image(&self, image: &str, source: &Path) -> Result<(), BackendError>;

    /// Create and start one instance, returning its handle.
    async fn run(&self, spec: &RunSpec) -> Result<ExecutionHandle, BackendError>;

    /// Stop a running instance.
    async fn stop(&self, handle: &ExecutionHandle) -> Result<(), BackendError>;

    /// Remove a stopped instance and its anonymous volumes.
    async fn remove(&self, handle: &ExecutionHandle) -> Result<(), BackendError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Backend handle shared across device tasks.
pub type SharedBackend = Arc<dyn ExecutionBackend>;

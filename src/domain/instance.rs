//! Per-device runtime types.

use std::fmt;
use std::path::{Path, PathBuf};

use super::id::{DeviceId, DeviceName};

/// Path inside the container where the agent expects its factory-reset file.
pub const AGENT_BOOTSTRAP_TARGET: &str = "/etc/factory_reset_example.txt";

/// Opaque identifier issued by an execution backend for a running instance.
///
/// Owned by exactly one device task; it is not `Clone` so it cannot leak to
/// another task by accident.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ExecutionHandle(String);

impl ExecutionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the backend needs to create and start one isolated instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    /// Image reference produced by the one-time build.
    pub image: String,
    /// Name given to the instance, `<prefix>-<id>-<tag>`.
    pub instance_name: String,
    /// Bootstrap file on the host, bound to [`AGENT_BOOTSTRAP_TARGET`].
    pub mount_source: PathBuf,
}

/// A device whose bootstrap file is rendered and whose instance is running.
#[derive(Debug)]
pub struct DeviceInstance {
    id: DeviceId,
    name: DeviceName,
    bootstrap_path: PathBuf,
    handle: ExecutionHandle,
}

impl DeviceInstance {
    pub fn new(
        id: DeviceId,
        name: DeviceName,
        bootstrap_path: PathBuf,
        handle: ExecutionHandle,
    ) -> Self {
        Self {
            id,
            name,
            bootstrap_path,
            handle,
        }
    }

    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &DeviceName {
        &self.name
    }

    #[must_use]
    pub fn bootstrap_path(&self) -> &Path {
        &self.bootstrap_path
    }

    #[must_use]
    pub const fn handle(&self) -> &ExecutionHandle {
        &self.handle
    }

    /// Release the instance, handing back the handle for teardown.
    #[must_use]
    pub fn into_handle(self) -> ExecutionHandle {
        self.handle
    }
}

//! Supervision of a single simulated device.
//!
//! A device task runs its instance, parks on the shared cancellation token,
//! and tears the instance down once the token fires. Teardown calls are
//! never raced against the token, so cancellation cannot abandon them.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::{
    DeviceId, DeviceInstance, DeviceName, ExecutionHandle, RunSpec, TeardownPolicy,
};
use crate::port::SharedBackend;

/// Read-only context shared by every device task of a fleet.
#[derive(Clone)]
pub struct DeviceRuntime {
    pub backend: SharedBackend,
    pub image: Arc<str>,
    pub shutdown: CancellationToken,
    pub policy: TeardownPolicy,
}

impl DeviceRuntime {
    pub fn new(
        backend: SharedBackend,
        image: impl Into<Arc<str>>,
        shutdown: CancellationToken,
        policy: TeardownPolicy,
    ) -> Self {
        Self {
            backend,
            image: image.into(),
            shutdown,
            policy,
        }
    }
}

/// How a device task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// The bootstrap file could not be written; nothing was started.
    BootstrapFailed,
    /// `run` failed. `teardown` is set when stop/remove were still attempted.
    StartFailed { teardown: Option<Teardown> },
    /// The instance ran until cancellation and was then torn down.
    Stopped(Teardown),
}

/// Result of the stop/remove pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teardown {
    pub stopped: bool,
    pub removed: bool,
}

impl Teardown {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.stopped && self.removed
    }
}

/// Run the instance described by `spec` and hold it until cancellation.
pub(crate) async fn supervise(
    id: DeviceId,
    name: DeviceName,
    spec: RunSpec,
    runtime: &DeviceRuntime,
) -> DeviceOutcome {
    let handle = match runtime.backend.run(&spec).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(device = %name, error = %e, "Failed to start instance");
            return start_failed(&name, spec, runtime).await;
        }
    };

    let instance = DeviceInstance::new(id, name, spec.mount_source, handle);
    info!(
        device = %instance.name(),
        id = %instance.id(),
        instance = %spec.instance_name,
        handle = %instance.handle(),
        bootstrap = %instance.bootstrap_path().display(),
        "Instance started"
    );

    runtime.shutdown.cancelled().await;

    let name = instance.name().clone();
    let teardown = teardown(&name, instance.into_handle(), &runtime.backend).await;
    DeviceOutcome::Stopped(teardown)
}

async fn start_failed(name: &DeviceName, spec: RunSpec, runtime: &DeviceRuntime) -> DeviceOutcome {
    match runtime.policy {
        TeardownPolicy::SkipOnFailedStart => DeviceOutcome::StartFailed { teardown: None },
        TeardownPolicy::AlwaysAttempt => {
            runtime.shutdown.cancelled().await;
            // Docker resolves names as well as ids, so this also reaches a
            // container that was created but failed to start.
            let handle = ExecutionHandle::new(spec.instance_name);
            let teardown = teardown(name, handle, &runtime.backend).await;
            DeviceOutcome::StartFailed {
                teardown: Some(teardown),
            }
        }
    }
}

/// Stop then remove. Remove is attempted even when stop fails.
async fn teardown(
    name: &DeviceName,
    handle: ExecutionHandle,
    backend: &SharedBackend,
) -> Teardown {
    let stopped = match backend.stop(&handle).await {
        Ok(()) => true,
        Err(e) => {
            warn!(device = %name, error = %e, "Failed to stop instance");
            false
        }
    };

    let removed = match backend.remove(&handle).await {
        Ok(()) => true,
        Err(e) => {
            error!(device = %name, error = %e, "Failed to remove instance");
            false
        }
    };

    let teardown = Teardown { stopped, removed };
    if teardown.is_clean() {
        info!(device = %name, handle = %handle, "Instance removed");
    }
    teardown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_is_clean_only_when_both_steps_succeed() {
        let clean = Teardown {
            stopped: true,
            removed: true,
        };
        assert!(clean.is_clean());

        for (stopped, removed) in [(false, true), (true, false), (false, false)] {
            assert!(!Teardown { stopped, removed }.is_clean());
        }
    }
}

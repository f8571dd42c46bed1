//! Fleet lifecycle orchestration.
//!
//! # Lifecycle
//!
//! 1. **ResolvingVariant**: pick the protocol variant and the config directory
//! 2. **BuildingImage**: build the agent image once
//! 3. **Spawning**: register and spawn one task per device id, ascending
//! 4. **Running**: nothing to do until the shutdown token fires
//! 5. **Draining**: wait on the join barrier
//! 6. **Terminated**: every instance confirmed torn down
//!
//! Failures before `Spawning` abort the run with nothing registered. After
//! that, per-device failures stay inside their task.
//!
//! There is no admission control: every device task is spawned at once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::barrier::JoinBarrier;
use super::state::Lifecycle;
use crate::application::device::DeviceRuntime;
use crate::domain::{
    DeviceName, DeviceRange, FleetReport, FleetRequest, FleetState, ProtocolVariant,
};
use crate::error::{ConfigError, Result};
use crate::port::SharedBackend;

/// Directory under the working directory used when none is configured.
pub const DEFAULT_CONFIG_SUBDIR: &str = "configs";

/// Orchestrator for one fleet run, before launch.
pub struct FleetOrchestrator {
    backend: SharedBackend,
    lifecycle: Lifecycle,
    barrier: JoinBarrier,
}

impl FleetOrchestrator {
    #[must_use]
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            lifecycle: Lifecycle::new(),
            barrier: JoinBarrier::new(),
        }
    }

    /// Watch the lifecycle state. Stays valid across launch and drain.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FleetState> {
        self.lifecycle.subscribe()
    }

    /// Launch the fleet and block until it has drained after `shutdown`.
    pub async fn run(
        self,
        request: FleetRequest,
        shutdown: CancellationToken,
    ) -> Result<FleetReport> {
        let fleet = self.launch(&request, shutdown).await?;
        Ok(fleet.drain().await)
    }

    /// Resolve, build and spawn every device. Returns once all device tasks
    /// are spawned, without waiting for any of them to start.
    pub async fn launch(
        self,
        request: &FleetRequest,
        shutdown: CancellationToken,
    ) -> Result<RunningFleet> {
        DeviceName::validate_prefix(&request.prefix)?;
        let variant = ProtocolVariant::select(request.protocol, &request.parameters)?;
        let dir = resolve_config_dir(request.config_dir.as_deref())?;
        info!(
            protocol = %variant.kind(),
            instances = request.devices.len(),
            start_id = request.devices.start(),
            prefix = %request.prefix,
            dir = %dir.display(),
            "Resolved fleet"
        );

        self.lifecycle.advance(FleetState::BuildingImage);
        info!(
            backend = self.backend.name(),
            image = %request.image.name,
            source = %request.image.source.display(),
            "Building agent image"
        );
        self.backend
            .build_image(&request.image.name, &request.image.source)
            .await?;

        self.lifecycle.advance(FleetState::Spawning);
        let runtime = DeviceRuntime::new(
            Arc::clone(&self.backend),
            request.image.name.as_str(),
            shutdown.clone(),
            request.teardown_policy,
        );
        self.spawn_devices(request, variant, dir, &runtime);

        self.lifecycle.advance(FleetState::Running);
        info!(instances = request.devices.len(), "Fleet running");

        Ok(RunningFleet {
            lifecycle: self.lifecycle,
            barrier: self.barrier,
            shutdown,
            devices: request.devices,
            protocol: request.protocol.to_string(),
        })
    }

    fn spawn_devices(
        &self,
        request: &FleetRequest,
        variant: ProtocolVariant,
        dir: PathBuf,
        runtime: &DeviceRuntime,
    ) {
        let variant = Arc::new(variant);
        let dir: Arc<Path> = Arc::from(dir);
        let prefix: Arc<str> = Arc::from(request.prefix.as_str());

        for id in request.devices.iter() {
            let registration = self.barrier.register();
            let variant = Arc::clone(&variant);
            let dir = Arc::clone(&dir);
            let prefix = Arc::clone(&prefix);
            let runtime = runtime.clone();

            tokio::spawn(async move {
                let outcome = variant.start(id, &prefix, &dir, &runtime).await;
                debug!(device = %DeviceName::new(&prefix, id), ?outcome, "Device task finished");
                registration.deregister();
            });
        }
    }
}

/// A launched fleet waiting for shutdown.
pub struct RunningFleet {
    lifecycle: Lifecycle,
    barrier: JoinBarrier,
    shutdown: CancellationToken,
    devices: DeviceRange,
    protocol: String,
}

impl RunningFleet {
    #[must_use]
    pub fn state(&self) -> FleetState {
        self.lifecycle.current()
    }

    /// Device tasks that have not deregistered yet.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.barrier.outstanding()
    }

    /// Wait for the shutdown token, then for every device to tear down.
    pub async fn drain(self) -> FleetReport {
        self.shutdown.cancelled().await;
        self.lifecycle.advance(FleetState::Draining);
        info!(outstanding = self.barrier.outstanding(), "Draining fleet");

        self.barrier.wait().await;
        self.lifecycle.advance(FleetState::Terminated);
        info!(instances = self.devices.len(), "Fleet terminated");

        FleetReport {
            instances: self.devices.len(),
            start_id: self.devices.start(),
            protocol: self.protocol,
            state: self.lifecycle.current(),
        }
    }
}

/// Use `configured`, or `<cwd>/configs`, and require it to be a directory.
///
/// Returns the canonical absolute path.
pub fn resolve_config_dir(
    configured: Option<&Path>,
) -> std::result::Result<PathBuf, ConfigError> {
    let dir = match configured {
        Some(dir) => dir.to_path_buf(),
        None => {
            let cwd = std::env::current_dir().map_err(|source| ConfigError::ConfigDir {
                path: PathBuf::from("."),
                source,
            })?;
            let dir = cwd.join(DEFAULT_CONFIG_SUBDIR);
            info!(dir = %dir.display(), "Config directory not set, using working directory");
            dir
        }
    };

    let metadata = fs::metadata(&dir).map_err(|source| ConfigError::ConfigDir {
        path: dir.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ConfigError::ConfigDir {
            path: dir,
            source: io::Error::other("not a directory"),
        });
    }
    // Bind mounts need absolute host paths.
    fs::canonicalize(&dir).map_err(|source| ConfigError::ConfigDir { path: dir, source })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::MtpKind;
    use crate::error::Error;
    use crate::testkit::backend::RecordingBackend;
    use crate::testkit::fleet;

    #[test]
    fn resolve_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = resolve_config_dir(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigDir { .. }));
    }

    #[test]
    fn resolve_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(resolve_config_dir(Some(&file)).is_err());
    }

    #[test]
    fn resolve_accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_config_dir(Some(dir.path())).unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn launch_reaches_running_with_every_device_registered() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::new());
        let shutdown = CancellationToken::new();

        let fleet = FleetOrchestrator::new(backend.clone())
            .launch(&fleet::mqtt_request(dir.path(), "dev", 0, 4), shutdown.clone())
            .await
            .unwrap();

        assert_eq!(fleet.state(), FleetState::Running);
        assert_eq!(fleet.outstanding(), 4);

        shutdown.cancel();
        let report = tokio::time::timeout(Duration::from_secs(5), fleet.drain())
            .await
            .expect("fleet drains");
        assert_eq!(report.state, FleetState::Terminated);
        assert_eq!(report.instances, 4);
    }

    #[tokio::test]
    async fn stomp_is_rejected_before_building() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::new());
        let orchestrator = FleetOrchestrator::new(backend.clone());
        let state = orchestrator.subscribe();
        let request = fleet::request(dir.path(), MtpKind::Stomp, "dev", 0, 3);

        let result = orchestrator.launch(&request, CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::UnimplementedProtocol(MtpKind::Stomp)))
        ));
        assert_eq!(*state.borrow(), FleetState::ResolvingVariant);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn unsafe_values_are_rejected_before_building() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::new());

        let mut request = fleet::mqtt_request(dir.path(), "dev", 0, 2);
        request.parameters.mqtt.username = "agent\"\nDevice.LocalAgent.EndpointID \"x".into();
        let result = FleetOrchestrator::new(backend.clone())
            .launch(&request, CancellationToken::new())
            .await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "mqtt-username", .. }))
        ));

        let request = fleet::mqtt_request(dir.path(), "dev lab", 0, 2);
        let result = FleetOrchestrator::new(backend.clone())
            .launch(&request, CancellationToken::new())
            .await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "prefix", .. }))
        ));

        assert!(backend.calls().is_empty());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn build_failure_is_fatal_and_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::new().fail_build());
        let orchestrator = FleetOrchestrator::new(backend.clone());
        let state = orchestrator.subscribe();

        let result = orchestrator
            .launch(&fleet::mqtt_request(dir.path(), "dev", 0, 3), CancellationToken::new())
            .await;

        assert!(matches!(result, Err(Error::Backend(_))));
        assert_eq!(*state.borrow(), FleetState::BuildingImage);
        assert_eq!(backend.builds(), 1);
        assert!(backend.runs().is_empty());
    }
}

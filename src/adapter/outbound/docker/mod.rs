//! Docker implementation of the execution backend.
//!
//! Every simulated device runs `obuspa` in its own container on the default
//! bridge network, with its bootstrap file bind-mounted where the agent
//! looks for its factory-reset database.

mod context;

use std::path::Path;
use std::pin::pin;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
};
use bollard::image::BuildImageOptions;
use bollard::models::{HostConfig, Mount, MountTypeEnum};
use bollard::Docker;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::domain::{ExecutionHandle, RunSpec, AGENT_BOOTSTRAP_TARGET};
use crate::error::BackendError;
use crate::port::ExecutionBackend;

/// Agent command line, reading the mounted factory-reset file.
const AGENT_COMMAND: [&str; 6] = ["obuspa", "-p", "-v", "4", "-r", AGENT_BOOTSTRAP_TARGET];

const NETWORK_MODE: &str = "bridge";

/// Execution backend talking to the local Docker daemon.
///
/// The `bollard` client is cheap to share and safe for concurrent use.
#[derive(Clone)]
pub struct DockerBackend {
    docker: Docker,
}

impl DockerBackend {
    /// Connect using the environment (`DOCKER_HOST`) or the local socket.
    pub fn connect() -> Result<Self, BackendError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| BackendError::Connect(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Force-remove a container that was created but never started.
    async fn discard(&self, id: &str, instance: &str) {
        let options = RemoveContainerOptions {
            v: true,
            force: true,
            ..Default::default()
        };
        match self.docker.remove_container(id, Some(options)).await {
            Ok(()) => debug!(instance, "Removed container that failed to start"),
            Err(e) => warn!(
                instance,
                error = %e,
                "Failed to remove container that failed to start"
            ),
        }
    }

    fn container_config(spec: &RunSpec) -> Config<String> {
        let mount = Mount {
            typ: Some(MountTypeEnum::BIND),
            source: Some(spec.mount_source.to_string_lossy().into_owned()),
            target: Some(AGENT_BOOTSTRAP_TARGET.to_string()),
            ..Default::default()
        };

        Config {
            image: Some(spec.image.clone()),
            cmd: Some(AGENT_COMMAND.iter().map(|s| (*s).to_string()).collect()),
            tty: Some(true),
            host_config: Some(HostConfig {
                network_mode: Some(NETWORK_MODE.to_string()),
                mounts: Some(vec![mount]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ExecutionBackend for DockerBackend {
    async fn build_image(&self, image: &str, source: &Path) -> Result<(), BackendError> {
        let build_err = |reason: String| BackendError::Build {
            image: image.to_string(),
            reason,
        };

        let context = context::dockerfile_context(source)?;
        let options = BuildImageOptions {
            dockerfile: context::DOCKERFILE,
            t: image,
            rm: true,
            ..Default::default()
        };

        let mut output = pin!(self.docker.build_image(options, None, Some(context.into())));
        while let Some(message) = output.next().await {
            let info = message.map_err(|e| build_err(e.to_string()))?;
            if let Some(error) = info.error {
                return Err(build_err(error));
            }
            if let Some(line) = info.stream {
                let line = line.trim_end();
                if !line.is_empty() {
                    debug!(image, "{line}");
                }
            }
        }

        info!(image, "Image built");
        Ok(())
    }

    async fn run(&self, spec: &RunSpec) -> Result<ExecutionHandle, BackendError> {
        let run_err = |e: bollard::errors::Error| BackendError::Run {
            name: spec.instance_name.clone(),
            reason: e.to_string(),
        };

        let options = CreateContainerOptions {
            name: spec.instance_name.as_str(),
            platform: None,
        };
        let created = self
            .docker
            .create_container(Some(options), Self::container_config(spec))
            .await
            .map_err(run_err)?;

        for warning in &created.warnings {
            debug!(instance = %spec.instance_name, warning, "Container create warning");
        }

        if let Err(e) = self
            .docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
        {
            // The name stays taken until the container is removed.
            self.discard(&created.id, &spec.instance_name).await;
            return Err(run_err(e));
        }

        Ok(ExecutionHandle::new(created.id))
    }

    async fn stop(&self, handle: &ExecutionHandle) -> Result<(), BackendError> {
        self.docker
            .stop_container(handle.as_str(), None)
            .await
            .map_err(|e| BackendError::Stop {
                handle: handle.to_string(),
                reason: e.to_string(),
            })
    }

    async fn remove(&self, handle: &ExecutionHandle) -> Result<(), BackendError> {
        let options = RemoveContainerOptions {
            v: true,
            force: true,
            ..Default::default()
        };
        self.docker
            .remove_container(handle.as_str(), Some(options))
            .await
            .map_err(|e| BackendError::Remove {
                handle: handle.to_string(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "docker"
    }
}

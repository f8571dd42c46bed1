//! agent-sim: a fleet of simulated USP agents for controller testing.
//!
//! Each simulated device runs the real `obuspa` agent inside its own Docker
//! container, bootstrapped with a generated factory-reset file that points it
//! at the controller over MQTT or WebSockets. The whole fleet starts at once
//! and is torn down together on SIGINT or SIGTERM.
//!
//! # Modules
//!
//! - [`domain`] - Device ids, protocol parameters, fleet request and state
//! - [`port`] - The execution backend trait the application depends on
//! - [`application`] - Bootstrap rendering, device supervision, orchestration
//! - [`adapter`] - Docker backend and the command line
//! - [`infrastructure`] - Environment files, logging, signal handling
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use agent_sim::adapter::outbound::docker::DockerBackend;
//! use agent_sim::application::fleet::FleetOrchestrator;
//! use agent_sim::domain::{
//!     DeviceRange, FleetRequest, ImageSpec, MtpKind, ProtocolParameters, TeardownPolicy,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> agent_sim::error::Result<()> {
//! let request = FleetRequest {
//!     devices: DeviceRange::new(0, 10).expect("in range"),
//!     prefix: "oktopus".into(),
//!     protocol: MtpKind::Mqtt,
//!     parameters: ProtocolParameters::default(),
//!     config_dir: None,
//!     image: ImageSpec {
//!         name: "oktopus-agent-sim".into(),
//!         source: "agent.Dockerfile".into(),
//!     },
//!     teardown_policy: TeardownPolicy::default(),
//! };
//!
//! let backend = Arc::new(DockerBackend::connect()?);
//! let shutdown = CancellationToken::new();
//! let report = FleetOrchestrator::new(backend).run(request, shutdown).await?;
//! println!("{} devices torn down", report.instances);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

//! Handler for the simulator run.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::command::Cli;
use super::output;
use crate::adapter::outbound::docker::DockerBackend;
use crate::application::fleet::FleetOrchestrator;
use crate::domain::{
    DeviceName, DeviceRange, FleetReport, FleetRequest, ImageSpec, MtpKind, ProtocolVariant,
    TeardownPolicy,
};
use crate::error::{ConfigError, Result};
use crate::infrastructure::shutdown;
use crate::port::SharedBackend;

/// Validate the options, start the fleet, and block until it has drained
/// after SIGINT or SIGTERM.
pub async fn execute(cli: &Cli) -> Result<()> {
    let request = build_fleet_request(cli)?;
    print_startup(&request);

    let backend: SharedBackend = Arc::new(DockerBackend::connect()?);
    let token = CancellationToken::new();
    shutdown::spawn_listener(token.clone());

    let report = FleetOrchestrator::new(backend).run(request, token).await?;
    print_report(&report);
    Ok(())
}

/// Turn parsed options into a request, rejecting anything that cannot run.
///
/// Protocols without an implementation, and values the bootstrap file or a
/// container name cannot hold, are refused here so the operator sees the
/// diagnostic before any Docker work starts.
pub fn build_fleet_request(cli: &Cli) -> std::result::Result<FleetRequest, ConfigError> {
    let protocol: MtpKind = cli.protocol.as_deref().unwrap_or_default().parse()?;
    let parameters = cli.protocol_parameters();
    ProtocolVariant::select(protocol, &parameters)?;

    let devices = DeviceRange::new(cli.num_to_start_ids, cli.sim_number).ok_or_else(|| {
        ConfigError::InvalidValue {
            field: "sim-number",
            reason: format!(
                "{} devices starting at {} run past the largest device id",
                cli.sim_number, cli.num_to_start_ids
            ),
        }
    })?;

    let prefix = cli.prefix.trim();
    DeviceName::validate_prefix(prefix)?;

    let source = cli.dockerfile.clone().ok_or(ConfigError::MissingField {
        field: "dockerfile",
    })?;

    Ok(FleetRequest {
        devices,
        prefix: prefix.to_string(),
        protocol,
        parameters,
        config_dir: cli.path.clone(),
        image: ImageSpec {
            name: cli.image_name.clone(),
            source,
        },
        teardown_policy: TeardownPolicy::from(cli.teardown_policy),
    })
}

#[derive(Serialize)]
struct Startup<'a> {
    protocol: MtpKind,
    instances: u32,
    start_id: u32,
    prefix: &'a str,
    image: &'a ImageSpec,
    teardown_policy: TeardownPolicy,
}

fn print_startup(request: &FleetRequest) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Protocol", request.protocol);
    output::field("Devices", request.devices.len());
    output::field("First id", request.devices.start());
    output::field("Prefix", &request.prefix);
    output::field("Image", &request.image.name);
    output::field("Dockerfile", request.image.source.display());
    match &request.config_dir {
        Some(dir) => output::field("Configs", dir.display()),
        None => output::field("Configs", "./configs"),
    }
    output::document(
        "startup",
        &Startup {
            protocol: request.protocol,
            instances: request.devices.len(),
            start_id: request.devices.start(),
            prefix: &request.prefix,
            image: &request.image,
            teardown_policy: request.teardown_policy,
        },
    );
    info!("Press Ctrl+C to stop the fleet");
}

fn print_report(report: &FleetReport) {
    output::section("Shutdown");
    output::field("Devices", report.instances);
    output::field("State", report.state);
    output::document("report", report);
    output::success("All devices torn down");
}

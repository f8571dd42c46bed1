//! Canonical fleet requests.
//!
//! Single source of truth for requests used across tests.

use std::path::Path;

use crate::domain::{
    DeviceRange, FleetRequest, ImageSpec, MtpKind, ProtocolParameters, TeardownPolicy,
};

/// Fleet of `count` devices starting at `start`, writing into `dir`.
pub fn request(
    dir: &Path,
    protocol: MtpKind,
    prefix: &str,
    start: u32,
    count: u32,
) -> FleetRequest {
    FleetRequest {
        devices: DeviceRange::new(start, count).expect("test range fits in u32"),
        prefix: prefix.to_string(),
        protocol,
        parameters: ProtocolParameters::default(),
        config_dir: Some(dir.to_path_buf()),
        image: ImageSpec {
            name: "agent-sim:test".into(),
            source: dir.join("Dockerfile"),
        },
        teardown_policy: TeardownPolicy::default(),
    }
}

/// MQTT fleet, the most common test shape.
pub fn mqtt_request(dir: &Path, prefix: &str, start: u32, count: u32) -> FleetRequest {
    request(dir, MtpKind::Mqtt, prefix, start, count)
}

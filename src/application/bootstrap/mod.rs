//! Bootstrap file generation.
//!
//! Each simulated agent starts from a factory-reset database rendered as
//! plain text: one `Parameter "value"` pair per line, `#` for comments. The
//! content depends only on the device id, the prefix and the variant
//! parameters, so regenerating a file yields identical bytes.
//!
//! Two fleets writing the same `(prefix, id, protocol)` into the same
//! directory race on the same path; the last writer wins.

mod mqtt;
mod websocket;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{DeviceId, DeviceName, ProtocolVariant};
use crate::error::BootstrapError;

/// Controller endpoint every agent registers with.
pub const CONTROLLER_ENDPOINT_ID: &str = "oktopusController";

/// Topic the controller listens on for agent messages.
pub const CONTROLLER_TOPIC: &str = "oktopus/v1/controller";

/// File name for a device's bootstrap file, `<prefix>-<id>-<tag>.txt`.
#[must_use]
pub fn file_name(prefix: &str, id: DeviceId, variant: &ProtocolVariant) -> String {
    format!(
        "{}.txt",
        DeviceName::new(prefix, id).with_tag(variant.tag())
    )
}

/// Render the bootstrap file content without touching the filesystem.
#[must_use]
pub fn render(prefix: &str, id: DeviceId, variant: &ProtocolVariant) -> String {
    let device = Device::new(prefix, id, variant.tag());
    let mut out = String::with_capacity(4096);
    write_header(&mut out);
    match variant {
        ProtocolVariant::MessageBus(params) => mqtt::render(&mut out, &device, params),
        ProtocolVariant::PersistentSocket(params) => websocket::render(&mut out, &device, params),
    }
    out
}

/// Render and write the bootstrap file for one device, returning its path.
///
/// Overwrites any previous file at the same path.
pub fn generate(
    id: DeviceId,
    prefix: &str,
    dir: &Path,
    variant: &ProtocolVariant,
) -> Result<PathBuf, BootstrapError> {
    let path = dir.join(file_name(prefix, id, variant));
    fs::write(&path, render(prefix, id, variant)).map_err(|source| BootstrapError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Identity values shared by every generator.
struct Device {
    /// `<prefix>-<id>-<tag>`
    endpoint_id: String,
    /// `<prefix>-<id>`
    serial: String,
    /// `<prefix><id>`, used as MTP alias.
    alias: String,
}

impl Device {
    fn new(prefix: &str, id: DeviceId, tag: &str) -> Self {
        let name = DeviceName::new(prefix, id);
        Self {
            endpoint_id: name.with_tag(tag),
            serial: name.as_str().to_string(),
            alias: format!("{prefix}{id}"),
        }
    }
}

/// Append `name "value"`.
fn param(out: &mut String, name: &str, value: impl std::fmt::Display) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{name} \"{value}\"");
}

/// Append `name value` for unquoted booleans and references.
fn raw(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "{name} {value}");
}

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n#\n# {title}\n#\n");
}

fn write_header(out: &mut String) {
    out.push_str(
        "##########################################################################################################\n\
         #\n\
         # Factory reset database for a simulated USP agent.\n\
         #\n\
         # If no USP database exists when the agent starts, it creates one from the parameters in this file.\n\
         # Each line holds either a comment or a data model parameter and its factory reset value, separated\n\
         # by whitespace. Values may be enclosed in speech marks (the only way to express an empty string).\n\
         #\n\
         ##########################################################################################################\n",
    );
}

/// Controller registration and the boot event subscription.
fn write_controller_bootstrap(out: &mut String, device: &Device, protocol: &str) {
    section(out, "Controller bootstrap");
    param(out, "Device.LocalAgent.Controller.1.EndpointID", CONTROLLER_ENDPOINT_ID);
    param(out, "Device.LocalAgent.Controller.1.Alias", "cpe-1");
    raw(out, "Device.LocalAgent.Controller.1.Enable", "true");
    param(out, "Device.LocalAgent.Controller.1.PeriodicNotifInterval", 86400);
    param(
        out,
        "Device.LocalAgent.Controller.1.PeriodicNotifTime",
        "0001-01-01T00:00:00Z",
    );
    param(out, "Device.LocalAgent.Controller.1.ControllerCode", "");
    param(out, "Device.LocalAgent.Controller.1.MTP.1.Alias", &device.alias);
    raw(out, "Device.LocalAgent.Controller.1.MTP.1.Enable", "true");
    param(out, "Device.LocalAgent.Controller.1.MTP.1.Protocol", protocol);

    section(out, "Boot parameters");
    raw(out, "Device.LocalAgent.Controller.1.BootParameter.1.Enable", "true");
    param(
        out,
        "Device.LocalAgent.Controller.1.BootParameter.1.ParameterName",
        "Device.LocalAgent.EndpointID",
    );
    raw(out, "Device.LocalAgent.Subscription.1.Alias", "cpe-1");
    raw(out, "Device.LocalAgent.Subscription.1.Enable", "true");
    raw(out, "Device.LocalAgent.Subscription.1.ID", "default-boot-event-ACS");
    raw(
        out,
        "Device.LocalAgent.Subscription.1.Recipient",
        "Device.LocalAgent.Controller.1",
    );
    raw(out, "Device.LocalAgent.Subscription.1.NotifType", "Event");
    raw(out, "Device.LocalAgent.Subscription.1.ReferenceList", "Device.Boot!");
    raw(out, "Device.LocalAgent.Subscription.1.Persistent", "true");
}

/// Local agent identity and the trailing reboot cause.
fn write_local_agent(out: &mut String, device: &Device, protocol: &str) {
    section(out, "Local agent");
    param(out, "Device.LocalAgent.MTP.1.Alias", &device.alias);
    raw(out, "Device.LocalAgent.MTP.1.Enable", "true");
    param(out, "Device.LocalAgent.MTP.1.Protocol", protocol);
    param(out, "Device.DeviceInfo.SerialNumber", &device.serial);
    param(out, "Internal.Reboot.Cause", "LocalFactoryReset");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MqttParameters, WebSocketParameters};

    fn mqtt() -> ProtocolVariant {
        ProtocolVariant::MessageBus(MqttParameters::default())
    }

    #[test]
    fn file_name_includes_tag() {
        assert_eq!(file_name("dev", DeviceId::new(7), &mqtt()), "dev-7-mqtt.txt");
        let ws = ProtocolVariant::PersistentSocket(WebSocketParameters::default());
        assert_eq!(file_name("dev", DeviceId::new(7), &ws), "dev-7-websockets.txt");
    }

    #[test]
    fn render_is_deterministic() {
        let a = render("dev", DeviceId::new(1), &mqtt());
        let b = render("dev", DeviceId::new(1), &mqtt());
        assert_eq!(a, b);
    }

    #[test]
    fn render_differs_per_device() {
        let a = render("dev", DeviceId::new(1), &mqtt());
        let b = render("dev", DeviceId::new(2), &mqtt());
        assert_ne!(a, b);
    }

    #[test]
    fn render_contains_identity_and_bootstrap() {
        let content = render("dev", DeviceId::new(3), &mqtt());
        assert!(content.contains("Device.LocalAgent.EndpointID \"dev-3-mqtt\""));
        assert!(content.contains("Device.DeviceInfo.SerialNumber \"dev-3\""));
        assert!(content.contains("Device.LocalAgent.Controller.1.EndpointID \"oktopusController\""));
        assert!(content.contains("Device.LocalAgent.Subscription.1.ReferenceList Device.Boot!"));
    }

    #[test]
    fn every_non_comment_line_is_a_parameter_pair() {
        let content = render("dev", DeviceId::new(3), &mqtt());
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, value) = line.split_once(' ').expect("name and value");
            assert!(name.starts_with("Device.") || name.starts_with("Internal."), "{line}");
            assert!(!value.trim().is_empty(), "{line}");
        }
    }
}

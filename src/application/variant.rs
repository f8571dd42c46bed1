//! Per-protocol device start-up.

use std::path::Path;

use tracing::{error, info};

use super::bootstrap;
use super::device::{self, DeviceOutcome, DeviceRuntime};
use crate::domain::{DeviceId, DeviceName, ProtocolVariant, RunSpec};

impl ProtocolVariant {
    /// Bring up one device speaking this protocol and keep it running until
    /// the fleet is cancelled.
    ///
    /// Renders the bootstrap file into `dir`, runs the instance
    /// `<prefix>-<id>-<tag>` with that file mounted, waits for cancellation
    /// and tears the instance down. A bootstrap failure ends the device
    /// without starting anything.
    pub async fn start(
        &self,
        id: DeviceId,
        prefix: &str,
        dir: &Path,
        runtime: &DeviceRuntime,
    ) -> DeviceOutcome {
        let name = DeviceName::new(prefix, id);
        info!(device = %name, protocol = %self.kind(), "Starting device");

        let bootstrap_path = match bootstrap::generate(id, prefix, dir, self) {
            Ok(path) => path,
            Err(e) => {
                error!(device = %name, error = %e, "Failed to render bootstrap file");
                return DeviceOutcome::BootstrapFailed;
            }
        };

        let spec = RunSpec {
            image: runtime.image.to_string(),
            instance_name: name.with_tag(self.tag()),
            mount_source: bootstrap_path,
        };
        device::supervise(id, name, spec, runtime).await
    }
}

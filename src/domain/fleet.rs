//! Fleet-level request, lifecycle state and report types.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::id::DeviceRange;
use super::protocol::{MtpKind, ProtocolParameters};

/// Image to build once per run and to start every instance from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSpec {
    /// Tag applied to the built image.
    pub name: String,
    /// Dockerfile used as the build input.
    pub source: PathBuf,
}

/// What a device task does when its instance failed to start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownPolicy {
    /// Deregister right away; there is no handle to tear down.
    #[default]
    SkipOnFailedStart,
    /// Wait for cancellation like a healthy instance, then stop and remove
    /// by instance name. Cleans up containers that were created but never
    /// started.
    AlwaysAttempt,
}

/// Everything the orchestrator needs for one run. Immutable once started.
#[derive(Debug, Clone, Serialize)]
pub struct FleetRequest {
    pub devices: DeviceRange,
    pub prefix: String,
    /// Requested protocol. Resolved to a variant by the orchestrator, which
    /// rejects protocols without an implementation.
    pub protocol: MtpKind,
    pub parameters: ProtocolParameters,
    /// Where bootstrap files go. `None` means `<cwd>/configs`.
    pub config_dir: Option<PathBuf>,
    pub image: ImageSpec,
    pub teardown_policy: TeardownPolicy,
}

/// Orchestrator lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetState {
    ResolvingVariant,
    BuildingImage,
    Spawning,
    Running,
    Draining,
    Terminated,
}

impl FleetState {
    /// The single state reachable from `self`, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ResolvingVariant => Some(Self::BuildingImage),
            Self::BuildingImage => Some(Self::Spawning),
            Self::Spawning => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Terminated),
            Self::Terminated => None,
        }
    }
}

impl fmt::Display for FleetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingVariant => "resolving_variant",
            Self::BuildingImage => "building_image",
            Self::Spawning => "spawning",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Summary returned once every instance has confirmed teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetReport {
    pub instances: u32,
    pub start_id: u32,
    pub protocol: String,
    pub state: FleetState,
}

//! Protocol-agnostic fleet domain types.

mod fleet;
mod id;
mod instance;
mod protocol;

pub use fleet::{FleetReport, FleetRequest, FleetState, ImageSpec, TeardownPolicy};
pub use id::{DeviceId, DeviceName, DeviceRange};
pub use instance::{DeviceInstance, ExecutionHandle, RunSpec, AGENT_BOOTSTRAP_TARGET};
pub use protocol::{
    MqttParameters, MtpKind, ProtocolParameters, ProtocolVariant, WebSocketParameters,
};

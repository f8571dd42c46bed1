//! WebSocket (persistent-socket) bootstrap parameters.

use super::{param, section, write_controller_bootstrap, write_local_agent, Device};
use crate::domain::WebSocketParameters;

/// Port of the agent's own WebSocket server, for controller-initiated sessions.
const AGENT_SERVER_PORT: u16 = 8080;
const AGENT_SERVER_PATH: &str = "/usp";

pub(super) fn render(out: &mut String, device: &Device, params: &WebSocketParameters) {
    section(out, "Endpoint");
    param(out, "Device.LocalAgent.EndpointID", &device.endpoint_id);

    write_controller_bootstrap(out, device, "WebSocket");
    param(
        out,
        "Device.LocalAgent.Controller.1.AssignedRole",
        "Device.LocalAgent.ControllerTrust.Role.1",
    );
    param(
        out,
        "Device.LocalAgent.Controller.1.USPNotifRetryMinimumWaitInterval",
        5,
    );
    param(
        out,
        "Device.LocalAgent.Controller.1.USPNotifRetryIntervalMultiplier",
        2000,
    );

    section(out, "Controller WebSocket server (agent initiated sessions)");
    param(out, "Device.LocalAgent.Controller.1.MTP.1.WebSocket.Host", &params.addr);
    param(out, "Device.LocalAgent.Controller.1.MTP.1.WebSocket.Port", params.port);
    param(out, "Device.LocalAgent.Controller.1.MTP.1.WebSocket.Path", &params.route);
    param(
        out,
        "Device.LocalAgent.Controller.1.MTP.1.WebSocket.EnableEncryption",
        params.tls,
    );
    param(
        out,
        "Device.LocalAgent.Controller.1.MTP.1.WebSocket.KeepAliveInterval",
        30,
    );
    param(
        out,
        "Device.LocalAgent.Controller.1.MTP.1.WebSocket.SessionRetryMinimumWaitInterval",
        5,
    );
    param(
        out,
        "Device.LocalAgent.Controller.1.MTP.1.WebSocket.SessionRetryIntervalMultiplier",
        2000,
    );

    section(out, "Agent WebSocket server (controller initiated sessions)");
    param(out, "Device.LocalAgent.MTP.1.WebSocket.Port", AGENT_SERVER_PORT);
    param(out, "Device.LocalAgent.MTP.1.WebSocket.Path", AGENT_SERVER_PATH);
    param(out, "Device.LocalAgent.MTP.1.WebSocket.EnableEncryption", false);
    param(out, "Device.LocalAgent.MTP.1.WebSocket.KeepAliveInterval", 30);

    write_local_agent(out, device, "WebSocket");
}

//! MQTT (message-bus) bootstrap parameters.

use super::{
    param, raw, section, write_controller_bootstrap, write_local_agent, Device, CONTROLLER_TOPIC,
};
use crate::domain::MqttParameters;

const CLIENT: &str = "Device.MQTT.Client.1";

pub(super) fn render(out: &mut String, device: &Device, params: &MqttParameters) {
    section(out, "Endpoint");
    param(out, "Device.LocalAgent.EndpointID", &device.endpoint_id);

    write_controller_bootstrap(out, device, "MQTT");
    param(
        out,
        "Device.LocalAgent.Controller.1.MTP.1.MQTT.Reference",
        CLIENT,
    );
    param(out, "Device.LocalAgent.Controller.1.MTP.1.MQTT.Topic", CONTROLLER_TOPIC);

    section(out, "MQTT client");
    param(
        out,
        "Device.LocalAgent.MTP.1.MQTT.ResponseTopicConfigured",
        CONTROLLER_TOPIC,
    );
    param(out, "Device.LocalAgent.MTP.1.MQTT.Reference", CLIENT);
    param(out, "Device.MQTT.Client.1.BrokerAddress", &params.addr);
    param(out, "Device.MQTT.Client.1.BrokerPort", params.port);
    param(out, "Device.MQTT.Client.1.ProtocolVersion", "5.0");
    param(
        out,
        "Device.MQTT.Client.1.TransportProtocol",
        if params.tls { "TLS" } else { "TCP/IP" },
    );
    param(out, "Device.MQTT.Client.1.Username", &params.username);
    param(out, "Device.MQTT.Client.1.Password", &params.password);
    param(out, "Device.MQTT.Client.1.Alias", "cpe-1");
    raw(out, "Device.MQTT.Client.1.Enable", "true");
    param(out, "Device.MQTT.Client.1.ClientID", "");
    param(out, "Device.MQTT.Client.1.KeepAliveTime", 60);
    param(out, "Device.MQTT.Client.1.ConnectRetryTime", 5);
    param(out, "Device.MQTT.Client.1.ConnectRetryIntervalMultiplier", 2000);
    param(out, "Device.MQTT.Client.1.ConnectRetryMaxInterval", 60);

    write_local_agent(out, device, "MQTT");
}

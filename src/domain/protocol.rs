//! Message transfer protocols a simulated agent can use to reach the controller.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Protocol requested by the operator, before its parameters are attached.
///
/// `Stomp` is recognised so it can be rejected with a clear diagnostic;
/// no bootstrap generator exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MtpKind {
    Mqtt,
    Stomp,
    WebSockets,
}

impl MtpKind {
    /// The lowercase name used on the command line and in file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mqtt => "mqtt",
            Self::Stomp => "stomp",
            Self::WebSockets => "websockets",
        }
    }
}

impl fmt::Display for MtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MtpKind {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "" => Err(ConfigError::MissingField { field: "protocol" }),
            "mqtt" => Ok(Self::Mqtt),
            "stomp" => Ok(Self::Stomp),
            "websockets" => Ok(Self::WebSockets),
            other => Err(ConfigError::UnknownProtocol(other.to_string())),
        }
    }
}

/// Reject a value that cannot be written into a bootstrap file.
///
/// Values are written between double quotes with no escaping, so a quote or
/// a line break would end the value early and start a new parameter.
fn check_bootstrap_value(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match value.chars().find(|c| matches!(c, '"' | '\n' | '\r')) {
        Some(c) => Err(ConfigError::InvalidValue {
            field,
            reason: format!("must not contain {c:?}"),
        }),
        None => Ok(()),
    }
}

/// MQTT broker connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MqttParameters {
    pub addr: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub tls: bool,
}

impl MqttParameters {
    /// Check every value that ends up in the bootstrap file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bootstrap_value("mqtt-addr", &self.addr)?;
        check_bootstrap_value("mqtt-username", &self.username)?;
        check_bootstrap_value("mqtt-password", &self.password)
    }
}

impl Default for MqttParameters {
    fn default() -> Self {
        Self {
            addr: "localhost".into(),
            port: 1883,
            username: String::new(),
            password: String::new(),
            tls: false,
        }
    }
}

/// Controller WebSocket server parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebSocketParameters {
    pub addr: String,
    pub port: u16,
    pub route: String,
    pub tls: bool,
}

impl WebSocketParameters {
    /// Check every value that ends up in the bootstrap file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bootstrap_value("ws-addr", &self.addr)?;
        check_bootstrap_value("ws-route", &self.route)
    }
}

impl Default for WebSocketParameters {
    fn default() -> Self {
        Self {
            addr: "localhost".into(),
            port: 8080,
            route: "/ws/agent".into(),
            tls: false,
        }
    }
}

/// Parameters for every protocol, as configured. Only the set matching the
/// selected protocol is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolParameters {
    pub mqtt: MqttParameters,
    pub websockets: WebSocketParameters,
}

/// An implemented transport binding together with its parameters.
///
/// The set is closed: message-bus style (MQTT) and persistent-socket style
/// (WebSockets). Construction goes through [`ProtocolVariant::select`], which
/// refuses protocols without an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProtocolVariant {
    MessageBus(MqttParameters),
    PersistentSocket(WebSocketParameters),
}

impl ProtocolVariant {
    /// Attach the parameters for `kind`.
    ///
    /// Only the parameter set matching `kind` is kept, and only that set is
    /// validated.
    pub fn select(kind: MtpKind, parameters: &ProtocolParameters) -> Result<Self, ConfigError> {
        match kind {
            MtpKind::Mqtt => {
                parameters.mqtt.validate()?;
                Ok(Self::MessageBus(parameters.mqtt.clone()))
            }
            MtpKind::WebSockets => {
                parameters.websockets.validate()?;
                Ok(Self::PersistentSocket(parameters.websockets.clone()))
            }
            MtpKind::Stomp => Err(ConfigError::UnimplementedProtocol(kind)),
        }
    }

    /// The protocol this variant speaks.
    #[must_use]
    pub const fn kind(&self) -> MtpKind {
        match self {
            Self::MessageBus(_) => MtpKind::Mqtt,
            Self::PersistentSocket(_) => MtpKind::WebSockets,
        }
    }

    /// Suffix used in endpoint ids, container names and bootstrap file names.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.kind().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_protocols() {
        assert_eq!("mqtt".parse::<MtpKind>().unwrap(), MtpKind::Mqtt);
        assert_eq!(" WebSockets ".parse::<MtpKind>().unwrap(), MtpKind::WebSockets);
        assert_eq!("stomp".parse::<MtpKind>().unwrap(), MtpKind::Stomp);
    }

    #[test]
    fn empty_protocol_is_missing() {
        let err = "".parse::<MtpKind>().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "protocol" }));
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        let err = "coap".parse::<MtpKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProtocol(ref p) if p == "coap"));
    }

    #[test]
    fn stomp_has_no_variant() {
        let err =
            ProtocolVariant::select(MtpKind::Stomp, &ProtocolParameters::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnimplementedProtocol(MtpKind::Stomp)));
    }

    #[test]
    fn select_rejects_values_that_would_inject_parameters() {
        let mut parameters = ProtocolParameters::default();
        parameters.mqtt.password = "p\"w\nDevice.LocalAgent.EndpointID \"evil\"".into();

        let err = ProtocolVariant::select(MtpKind::Mqtt, &parameters).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "mqtt-password", .. }));
        assert!(!err.to_string().contains("evil"), "value is not echoed");
    }

    #[test]
    fn every_written_value_is_checked() {
        let mqtt: [(&str, fn(&mut MqttParameters)); 3] = [
            ("mqtt-addr", |p| p.addr = "broker\n".into()),
            ("mqtt-username", |p| p.username = "a\"b".into()),
            ("mqtt-password", |p| p.password = "x\ry".into()),
        ];
        for (field, corrupt) in mqtt {
            let mut params = MqttParameters::default();
            corrupt(&mut params);
            assert!(
                matches!(params.validate(), Err(ConfigError::InvalidValue { field: f, .. }) if f == field),
                "{field}"
            );
        }

        let ws: [(&str, fn(&mut WebSocketParameters)); 2] = [
            ("ws-addr", |p| p.addr = "host\"".into()),
            ("ws-route", |p| p.route = "/ws\nx".into()),
        ];
        for (field, corrupt) in ws {
            let mut params = WebSocketParameters::default();
            corrupt(&mut params);
            assert!(
                matches!(params.validate(), Err(ConfigError::InvalidValue { field: f, .. }) if f == field),
                "{field}"
            );
        }
    }

    #[test]
    fn only_the_selected_parameters_are_validated() {
        let mut parameters = ProtocolParameters::default();
        parameters.websockets.route = "/bad\"route".into();
        assert!(ProtocolVariant::select(MtpKind::Mqtt, &parameters).is_ok());
        assert!(ProtocolVariant::select(MtpKind::WebSockets, &parameters).is_err());
    }

    #[test]
    fn select_keeps_matching_parameters() {
        let variant =
            ProtocolVariant::select(MtpKind::WebSockets, &ProtocolParameters::default()).unwrap();
        assert_eq!(variant.tag(), "websockets");
        assert!(matches!(variant, ProtocolVariant::PersistentSocket(_)));
    }
}

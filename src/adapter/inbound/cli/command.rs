//! Command-line interface definitions.
//!
//! Every option can also come from the environment (or a `.env` file), so
//! the simulator can be driven by the same variables a compose file sets.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use crate::domain::{MqttParameters, ProtocolParameters, TeardownPolicy, WebSocketParameters};
use crate::infrastructure::config::LoggingConfig;

/// Spin up a fleet of simulated USP agents, one container per device
#[derive(Parser, Debug)]
#[command(name = "agent-sim")]
#[command(version)]
pub struct Cli {
    /// Number of devices to simulate
    #[arg(long, env = "SIM_NUM", default_value_t = 1)]
    pub sim_number: u32,

    /// First device id; devices are numbered upward from here
    #[arg(long, env = "NUM_TO_START_IDS", default_value_t = 0)]
    pub num_to_start_ids: u32,

    /// Message transfer protocol [mqtt, websockets]
    #[arg(long, env = "MTP")]
    pub protocol: Option<String>,

    /// Prefix for endpoint ids, serial numbers and container names
    #[arg(long, env = "PREFIX", default_value = "oktopus")]
    pub prefix: String,

    /// Directory for generated bootstrap files [default: ./configs]
    #[arg(long, env = "CONFIGS_PATH")]
    pub path: Option<PathBuf>,

    /// Dockerfile for the agent image
    #[arg(long, env = "DOCKERFILE_PATH")]
    pub dockerfile: Option<PathBuf>,

    /// Tag for the agent image
    #[arg(long, env = "IMAGE_NAME", default_value = "oktopus-agent-sim")]
    pub image_name: String,

    #[command(flatten)]
    pub mqtt: MqttArgs,

    #[command(flatten)]
    pub websockets: WebSocketArgs,

    /// What to do with a device whose container failed to start
    #[arg(
        long,
        env = "TEARDOWN_POLICY",
        value_enum,
        default_value_t = TeardownArg::SkipOnFailedStart
    )]
    pub teardown_policy: TeardownArg,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log line format
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty", value_parser = ["pretty", "json"])]
    pub log_format: String,

    /// JSON output for scripting
    #[arg(long)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }

    #[must_use]
    pub fn protocol_parameters(&self) -> ProtocolParameters {
        ProtocolParameters {
            mqtt: self.mqtt.clone().into(),
            websockets: self.websockets.clone().into(),
        }
    }
}

/// MQTT broker the agents connect to.
#[derive(Args, Debug, Clone)]
pub struct MqttArgs {
    /// Broker host
    #[arg(long, env = "MQTT_ADDR", default_value = "localhost")]
    pub mqtt_addr: String,

    /// Broker port
    #[arg(long, env = "MQTT_PORT", default_value_t = 1883)]
    pub mqtt_port: u16,

    /// Broker username
    #[arg(long, env = "MQTT_USERNAME", default_value = "")]
    pub mqtt_username: String,

    /// Broker password
    #[arg(long, env = "MQTT_PASSWORD", default_value = "", hide_env_values = true)]
    pub mqtt_password: String,

    /// Connect to the broker over TLS
    #[arg(long, env = "MQTT_TLS")]
    pub mqtt_tls: bool,
}

impl From<MqttArgs> for MqttParameters {
    fn from(args: MqttArgs) -> Self {
        Self {
            addr: args.mqtt_addr,
            port: args.mqtt_port,
            username: args.mqtt_username,
            password: args.mqtt_password,
            tls: args.mqtt_tls,
        }
    }
}

/// Controller WebSocket server the agents connect to.
#[derive(Args, Debug, Clone)]
pub struct WebSocketArgs {
    /// Server host
    #[arg(long, env = "WS_ADDR", default_value = "localhost")]
    pub ws_addr: String,

    /// Server port
    #[arg(long, env = "WS_PORT", default_value_t = 8080)]
    pub ws_port: u16,

    /// Agent route on the server
    #[arg(long, env = "WS_ROUTE", default_value = "/ws/agent")]
    pub ws_route: String,

    /// Connect over TLS
    #[arg(long, env = "WS_TLS")]
    pub ws_tls: bool,
}

impl From<WebSocketArgs> for WebSocketParameters {
    fn from(args: WebSocketArgs) -> Self {
        Self {
            addr: args.ws_addr,
            port: args.ws_port,
            route: args.ws_route,
            tls: args.ws_tls,
        }
    }
}

/// Command-line spelling of [`TeardownPolicy`].
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum TeardownArg {
    /// Forget devices whose container failed to start
    #[default]
    SkipOnFailedStart,
    /// Stop and remove them by name at shutdown anyway
    AlwaysAttempt,
}

impl From<TeardownArg> for TeardownPolicy {
    fn from(arg: TeardownArg) -> Self {
        match arg {
            TeardownArg::SkipOnFailedStart => Self::SkipOnFailedStart,
            TeardownArg::AlwaysAttempt => Self::AlwaysAttempt,
        }
    }
}

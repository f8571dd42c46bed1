//! Error types for the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::MtpKind;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown protocol '{0}' (expected mqtt, stomp or websockets)")]
    UnknownProtocol(String),

    #[error("protocol {0} is not implemented yet")]
    UnimplementedProtocol(MtpKind),

    #[error("config directory {} is not accessible: {source}", path.display())]
    ConfigDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to render a device bootstrap file.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("failed to write bootstrap file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Execution backend failures, each naming the object it concerned.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to connect to execution backend: {0}")]
    Connect(String),

    #[error("failed to read image source {}: {source}", path.display())]
    ImageSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build image {image}: {reason}")]
    Build { image: String, reason: String },

    #[error("failed to run instance {name}: {reason}")]
    Run { name: String, reason: String },

    #[error("failed to stop instance {handle}: {reason}")]
    Stop { handle: String, reason: String },

    #[error("failed to remove instance {handle}: {reason}")]
    Remove { handle: String, reason: String },
}

/// Any failure that ends a fleet run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, Error>;

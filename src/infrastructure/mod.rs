//! Process-level wiring: environment, logging and signal handling.

pub mod config;
pub mod shutdown;

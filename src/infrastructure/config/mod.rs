//! Process configuration outside the command line.

mod env;
mod logging;

pub use env::load_env;
pub use logging::LoggingConfig;

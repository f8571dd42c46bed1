//! Logging configuration and initialization.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration, taken from `--log-level` / `--log-format`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` for one object per line, anything else for human-readable.
    pub format: String,
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the configured level. Logs go to stderr since
    /// stdout carries the CLI output; colors only when stderr is a terminal.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        if self.is_json() {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        } else {
            fmt()
                .with_env_filter(filter)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .init();
        }
    }

    fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pretty_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.is_json());
    }

    #[test]
    fn json_format_is_case_insensitive() {
        let config = LoggingConfig {
            level: "debug".into(),
            format: "JSON".into(),
        };
        assert!(config.is_json());
    }
}

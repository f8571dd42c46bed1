//! Terminal output for the CLI.
//!
//! Human-readable lines by default, one JSON object per line with `--json`,
//! nothing but errors with `--quiet`. Logs go to stderr through `tracing`;
//! this module owns stdout.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{json, Value};

/// Output settings taken from `--json` and `--quiet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

/// Set the output mode. Only the first call has an effect.
pub fn configure(config: OutputConfig) {
    let _ = OUTPUT.set(config);
}

fn current() -> OutputConfig {
    OUTPUT.get().copied().unwrap_or_default()
}

/// Print `payload` as a `{"type", "payload"}` line in JSON mode, otherwise
/// run `human` unless quiet.
fn emit(kind: &str, payload: impl FnOnce() -> Value, human: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": payload() }));
    } else if !config.quiet {
        human();
    }
}

/// Application name and version.
pub fn header(version: &str) {
    emit(
        "header",
        || json!({ "app": "agent-sim", "version": version }),
        || println!("{} {}\n", "agent-sim".bold(), version.dimmed()),
    );
}

/// A labeled value. Human output only; [`document`] carries the same data
/// in JSON mode.
pub fn field(label: &str, value: impl Display) {
    let config = current();
    if !config.json && !config.quiet {
        println!("  {:<12} {}", label.dimmed(), value);
    }
}

/// A whole serializable value as one JSON line. Nothing outside JSON mode.
pub fn document<T: Serialize>(kind: &str, value: &T) {
    if !current().json {
        return;
    }
    match serde_json::to_value(value) {
        Ok(payload) => emit(kind, || payload, || {}),
        Err(e) => error(&format!("failed to serialize {kind}: {e}")),
    }
}

pub fn section(title: &str) {
    emit("section", || json!({ "title": title }), || {
        println!("\n{}", title.bold());
    });
}

pub fn success(message: &str) {
    emit("success", || json!({ "message": message }), || {
        println!("  {} {message}", "✓".green());
    });
}

/// An error on stderr, printed even when quiet.
pub fn error(message: &str) {
    if current().json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("  {} {message}", "×".red());
    }
}

//! Fleet orchestration: spawning, cancellation and the join barrier.

mod barrier;
mod orchestrator;
mod state;

pub use barrier::{JoinBarrier, Registration};
pub use orchestrator::{
    resolve_config_dir, FleetOrchestrator, RunningFleet, DEFAULT_CONFIG_SUBDIR,
};

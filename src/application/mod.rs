//! Application services (use cases).
//!
//! These services drive the domain through the execution backend port to
//! bring a fleet of simulated agents up and down.

pub mod bootstrap;
pub mod device;
pub mod fleet;
mod variant;

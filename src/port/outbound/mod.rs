//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies of the fleet
//! orchestrator.

pub mod backend;

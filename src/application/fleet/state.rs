//! Forward-only lifecycle tracking for one fleet run.

use tokio::sync::watch;
use tracing::{debug, error};

use crate::domain::FleetState;

/// Publishes the orchestrator state on a watch channel.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    tx: watch::Sender<FleetState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(FleetState::ResolvingVariant);
        Self { tx }
    }

    pub(crate) fn current(&self) -> FleetState {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<FleetState> {
        self.tx.subscribe()
    }

    /// Move to the successor of the current state.
    ///
    /// Requests for anything else are ignored and logged; the state never
    /// moves backward or skips ahead.
    pub(crate) fn advance(&self, to: FleetState) {
        let from = self.current();
        if from.next() != Some(to) {
            error!(%from, %to, "Rejected fleet state transition");
            return;
        }
        debug!(%from, %to, "Fleet state transition");
        self.tx.send_replace(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_one_step_at_a_time() {
        let lifecycle = Lifecycle::new();
        lifecycle.advance(FleetState::BuildingImage);
        assert_eq!(lifecycle.current(), FleetState::BuildingImage);

        lifecycle.advance(FleetState::Running);
        assert_eq!(lifecycle.current(), FleetState::BuildingImage);
    }

    #[test]
    fn never_moves_backward() {
        let lifecycle = Lifecycle::new();
        lifecycle.advance(FleetState::BuildingImage);
        lifecycle.advance(FleetState::ResolvingVariant);
        assert_eq!(lifecycle.current(), FleetState::BuildingImage);
    }

    #[test]
    fn subscribers_see_latest_state() {
        let lifecycle = Lifecycle::new();
        let rx = lifecycle.subscribe();
        lifecycle.advance(FleetState::BuildingImage);
        lifecycle.advance(FleetState::Spawning);
        assert_eq!(*rx.borrow(), FleetState::Spawning);
    }
}

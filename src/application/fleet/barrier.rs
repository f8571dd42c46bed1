//! Join barrier for device tasks.
//!
//! Built on [`TaskTracker`]: every registration holds a tracker token, and
//! dropping the token is the one and only deregistration. Because the token
//! lives inside the task future, a task that returns early or panics still
//! deregisters.

use tokio_util::task::task_tracker::TaskTrackerToken;
use tokio_util::task::TaskTracker;

/// Counts outstanding device tasks and lets a single caller wait for zero.
#[derive(Debug, Clone, Default)]
pub struct JoinBarrier {
    tracker: TaskTracker,
}

impl JoinBarrier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one task. Call before spawning it.
    #[must_use = "dropping the registration deregisters immediately"]
    pub fn register(&self) -> Registration {
        Registration {
            token: self.tracker.token(),
        }
    }

    /// Number of registered tasks that have not deregistered yet.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every registered task has deregistered.
    ///
    /// Closes the barrier first; registering after this call is a bug.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Proof that a task is registered with a [`JoinBarrier`].
///
/// Not `Clone`: a task deregisters exactly once, when this value is consumed
/// or dropped.
#[derive(Debug)]
pub struct Registration {
    token: TaskTrackerToken,
}

impl Registration {
    /// Deregister explicitly after teardown.
    pub fn deregister(self) {
        drop(self.token);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_returns_immediately_without_registrations() {
        let barrier = JoinBarrier::new();
        tokio::time::timeout(Duration::from_secs(1), barrier.wait())
            .await
            .expect("empty barrier drains");
    }

    #[tokio::test]
    async fn counts_registrations_until_deregistered() {
        let barrier = JoinBarrier::new();
        let first = barrier.register();
        let second = barrier.register();
        assert_eq!(barrier.outstanding(), 2);

        first.deregister();
        assert_eq!(barrier.outstanding(), 1);

        drop(second);
        assert_eq!(barrier.outstanding(), 0);
    }

    #[tokio::test]
    async fn wait_blocks_until_last_task_deregisters() {
        let barrier = JoinBarrier::new();
        let registration = barrier.register();

        let waiter = {
            let barrier = barrier.clone();
            tokio::spawn(async move { barrier.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        registration.deregister();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("barrier drains")
            .expect("waiter task");
    }

    #[tokio::test]
    async fn panicking_task_still_deregisters() {
        let barrier = JoinBarrier::new();
        let registration = barrier.register();
        let handle = tokio::spawn(async move {
            let _registration = registration;
            panic!("device task failed");
        });
        assert!(handle.await.is_err());
        assert_eq!(barrier.outstanding(), 0);
    }
}

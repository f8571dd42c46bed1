//! Scriptable in-memory [`ExecutionBackend`].
//!
//! Records every call in order and hands out the instance name as the
//! handle, so stop/remove calls can be matched back to the device that
//! issued them. Failures are injected per instance name, and `run` can be
//! held open for an instance until the test releases it.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{ExecutionHandle, RunSpec};
use crate::error::BackendError;
use crate::port::ExecutionBackend;

/// One recorded backend call, keyed by image or instance name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Build(String),
    Run(String),
    Stop(String),
    Remove(String),
}

impl BackendCall {
    fn target(&self) -> &str {
        match self {
            Self::Build(t) | Self::Run(t) | Self::Stop(t) | Self::Remove(t) => t,
        }
    }
}

#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    fail_build: bool,
    fail_run: HashSet<String>,
    fail_stop: HashSet<String>,
    fail_remove: HashSet<String>,
    held: HashMap<String, Arc<Notify>>,
    running: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `build_image` fail.
    #[must_use]
    pub fn fail_build(mut self) -> Self {
        self.fail_build = true;
        self
    }

    #[must_use]
    pub fn fail_run_for(mut self, instance: &str) -> Self {
        self.fail_run.insert(instance.to_string());
        self
    }

    #[must_use]
    pub fn fail_stop_for(mut self, instance: &str) -> Self {
        self.fail_stop.insert(instance.to_string());
        self
    }

    #[must_use]
    pub fn fail_remove_for(mut self, instance: &str) -> Self {
        self.fail_remove.insert(instance.to_string());
        self
    }

    /// Make `run` for `instance` wait until [`release`](Self::release).
    ///
    /// The call is recorded before it starts waiting.
    #[must_use]
    pub fn hold_run_for(mut self, instance: &str) -> Self {
        self.held.insert(instance.to_string(), Arc::new(Notify::new()));
        self
    }

    /// Let a held `run` for `instance` complete. May be called before the
    /// call arrives.
    ///
    /// # Panics
    ///
    /// If `instance` was not held.
    pub fn release(&self, instance: &str) {
        self.held
            .get(instance)
            .expect("instance is held")
            .notify_one();
    }

    /// Every call, in the order it reached the backend.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Calls that concerned one instance.
    pub fn calls_for(&self, instance: &str) -> Vec<BackendCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| !matches!(c, BackendCall::Build(_)) && c.target() == instance)
            .cloned()
            .collect()
    }

    /// Instance names passed to `run`, in call order.
    pub fn runs(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                BackendCall::Run(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn builds(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Build(_)))
    }

    pub fn stops(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Stop(_)))
    }

    pub fn removes(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Remove(_)))
    }

    /// Instances started and not yet removed.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    fn count(&self, f: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| f(c)).count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ExecutionBackend for RecordingBackend {
    async fn build_image(&self, image: &str, _source: &Path) -> Result<(), BackendError> {
        self.record(BackendCall::Build(image.to_string()));
        if self.fail_build {
            return Err(BackendError::Build {
                image: image.to_string(),
                reason: "scripted failure".into(),
            });
        }
        Ok(())
    }

    async fn run(&self, spec: &RunSpec) -> Result<ExecutionHandle, BackendError> {
        self.record(BackendCall::Run(spec.instance_name.clone()));
        if let Some(gate) = self.held.get(&spec.instance_name) {
            gate.notified().await;
        }
        if self.fail_run.contains(&spec.instance_name) {
            return Err(BackendError::Run {
                name: spec.instance_name.clone(),
                reason: "scripted failure".into(),
            });
        }
        self.running.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutionHandle::new(spec.instance_name.clone()))
    }

    async fn stop(&self, handle: &ExecutionHandle) -> Result<(), BackendError> {
        self.record(BackendCall::Stop(handle.to_string()));
        if self.fail_stop.contains(handle.as_str()) {
            return Err(BackendError::Stop {
                handle: handle.to_string(),
                reason: "scripted failure".into(),
            });
        }
        Ok(())
    }

    async fn remove(&self, handle: &ExecutionHandle) -> Result<(), BackendError> {
        self.record(BackendCall::Remove(handle.to_string()));
        if self.fail_remove.contains(handle.as_str()) {
            return Err(BackendError::Remove {
                handle: handle.to_string(),
                reason: "scripted failure".into(),
            });
        }
        // Saturate: removing a never-started instance is not an underflow.
        let _ = self
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

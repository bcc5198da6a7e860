//! Re-entrancy guard for named background tasks.
//!
//! A named task may not run concurrently with itself, but different tasks
//! run independently. The guard is an explicit, injected object rather than
//! process-wide state, so schedulers stay instantiable and testable in
//! isolation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Concurrency-safe set of in-flight task names.
#[derive(Clone, Default)]
pub struct TaskGuard {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl TaskGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to begin a named task. Returns `None` when the task is already
    /// running; the returned permit releases the name when dropped.
    pub fn try_begin(&self, name: &str) -> Option<TaskPermit> {
        let mut active = self.inner.lock().unwrap();
        if active.contains(name) {
            return None;
        }
        active.insert(name.to_string());
        Some(TaskPermit {
            name: name.to_string(),
            inner: Arc::clone(&self.inner),
        })
    }

    /// Names of the tasks currently in flight, sorted.
    pub fn active(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().unwrap().iter().cloned().collect();
        names.sort();
        names
    }

    pub fn is_idle(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

/// RAII permit for one named task run.
pub struct TaskPermit {
    name: String,
    inner: Arc<Mutex<HashSet<String>>>,
}

impl Drop for TaskPermit {
    fn drop(&mut self) {
        self.inner.lock().unwrap().remove(&self.name);
    }
}

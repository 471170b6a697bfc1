//! [`ExecutorRegistry`] — the process-wide, name-keyed set of executors.
//!
//! Grounded on the teacher's `type NodeRegistry = HashMap<String, Arc<dyn
//! ExecutableNode>>` (`crates/engine/src/executor.rs`), promoted to its own
//! component per the spec: `Register` is idempotent (first writer wins) and
//! readers never block each other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::executor::Executor;

/// Thread-safe, name-keyed registry of executors.
///
/// Populated once at startup via repeated [`Self::register`] calls, then
/// read for the remainder of the process's life. Backed by a reader-
/// preferred `RwLock`: concurrent reads never block each other, and a write
/// only blocks readers for the duration of a single insertion.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: RwLock<HashMap<String, Arc<dyn Executor>>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: RwLock::new(HashMap::new()),
        }
    }

    /// Register an executor under `name`.
    ///
    /// An empty `name` is rejected with a warning and no-op. A name that is
    /// already registered is left untouched (first writer wins) — this
    /// guarantees idempotent initialization when startup code runs more than
    /// once (e.g. duplicate module registration).
    pub fn register(&self, name: impl Into<String>, executor: Arc<dyn Executor>) {
        let name = name.into();
        if name.is_empty() {
            warn!("refusing to register executor with empty name");
            return;
        }
        let mut guard = self.executors.write().expect("executor registry lock poisoned");
        if guard.contains_key(&name) {
            warn!(executor = %name, "executor already registered, ignoring duplicate registration");
            return;
        }
        guard.insert(name, executor);
    }

    /// Look up an executor by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Executor>> {
        let guard = self.executors.read().expect("executor registry lock poisoned");
        guard.get(name).cloned()
    }

    /// Whether an executor is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        let guard = self.executors.read().expect("executor registry lock poisoned");
        guard.contains_key(name)
    }

    /// Number of registered executors.
    pub fn len(&self) -> usize {
        let guard = self.executors.read().expect("executor registry lock poisoned");
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

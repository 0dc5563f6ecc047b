//! Per-agent variable store shared with running tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use webhands_protocols::task::Variable;

/// Cloning yields a handle to the same store, so variables added while a task
/// runs are visible from its next step on.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    inner: Arc<RwLock<BTreeMap<String, Variable>>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the variable with the same key.
    pub fn add(&self, variable: Variable) {
        self.inner.write().insert(variable.key.clone(), variable);
    }

    pub fn get(&self, key: &str) -> Option<Variable> {
        self.inner.read().get(key).cloned()
    }

    pub fn delete(&self, key: &str) -> Option<Variable> {
        self.inner.write().remove(key)
    }

    /// All variables, ordered by key.
    pub fn list(&self) -> Vec<Variable> {
        self.inner.read().values().cloned().collect()
    }
}

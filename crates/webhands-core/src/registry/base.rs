//! Generic registry keyed by a string id.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Items that can be stored in a registry.
pub trait Registerable: Send + Sync {
    fn registry_id(&self) -> &str;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Not registered: {0}")]
    NotFound(String),
}

/// Thread-safe registry that iterates in registration order.
pub struct BaseRegistry<T: ?Sized + Registerable> {
    items: DashMap<String, (u64, Arc<T>)>,
    next_seq: AtomicU64,
}

impl<T: ?Sized + Registerable> BaseRegistry<T> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Register an item. Fails if the id is taken.
    pub fn register(&self, item: Arc<T>) -> Result<(), RegistryError> {
        let id = item.registry_id().to_string();
        match self.items.entry(id) {
            Entry::Occupied(entry) => {
                Err(RegistryError::AlreadyRegistered(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert((seq, item));
                Ok(())
            }
        }
    }

    /// Insert or replace an item, keeping the original position on replace.
    pub fn upsert(&self, item: Arc<T>) {
        let id = item.registry_id().to_string();
        let seq = match self.items.get(&id) {
            Some(existing) => existing.0,
            None => self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        self.items.insert(id, (seq, item));
    }

    pub fn unregister(&self, id: &str) -> Result<Arc<T>, RegistryError> {
        self.items
            .remove(id)
            .map(|(_, (_, item))| item)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.items.get(id).map(|entry| entry.1.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Registered ids in registration order.
    pub fn list_ids(&self) -> Vec<String> {
        self.values()
            .iter()
            .map(|item| item.registry_id().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in registration order.
    pub fn values(&self) -> Vec<Arc<T>> {
        let mut entries: Vec<(u64, Arc<T>)> = self
            .items
            .iter()
            .map(|entry| (entry.0, entry.1.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, item)| item).collect()
    }
}

impl<T: ?Sized + Registerable> Default for BaseRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;

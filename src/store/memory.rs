//! MemoryStore — a HashMap-backed `KeyValueStore`.
//!
//! The default backend for tests and for embedders that bring their own
//! persistence (e.g. a browser host that syncs the map to localStorage).

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::StoreError;

use super::traits::KeyValueStore;

/// In-memory key/value store.
///
/// Interior mutability via `parking_lot::Mutex`; all methods take `&self`.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key directly, bypassing the manager. Used to stage persisted
    /// state (including malformed payloads) in tests.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

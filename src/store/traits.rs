//! KeyValueStore — the narrow persistence seam under the basket manager.
//!
//! Mirrors the browser's local-storage contract: string keys to string
//! values, synchronous, no transactions. Concrete backends (in-memory,
//! SQLite) implement this; the manager never touches storage directly.

use crate::error::StoreError;

/// Durable client-local key/value storage.
///
/// Implementors must be `Send + Sync` so a store can be shared between the
/// basket manager and async callers (transfer, checkout).
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`. `None` if the key has never been set
    /// or has been removed.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key` entirely. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// A shared store is a store. Lets one backend sit under several owners
/// (e.g. the basket manager and a test asserting on persisted state).
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

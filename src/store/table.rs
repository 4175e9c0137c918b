//! Store implementation
//!
//! HashMap-based store with a parking_lot RwLock.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

/// Shared key/value store
///
/// ## Concurrency:
/// - Reads (`get`, `exists`, `len`) take the shared lock
/// - Writes (`set`, `delete`, `clear`) take the exclusive lock
/// - Each lock is held for one call only; nothing is held across calls
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<HashMap<Bytes, Bytes>>,
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Insert or overwrite a key (write lock)
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.data.write().insert(key, value);
    }

    /// Remove a key (write lock)
    ///
    /// Returns whether the key was present. Lookup and removal happen under
    /// the same exclusive acquisition.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.data.write().remove(key).is_some()
    }

    /// Check whether a key is present (read lock)
    pub fn exists(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

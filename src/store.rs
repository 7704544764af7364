use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// The Store holds every key-value pair written by any connection. A single reader-writer lock
/// guards the whole map: writes exclude each other and all reads, while reads may proceed
/// together. The lock is only ever held for the map access itself.
///
/// The store is cheap to clone; clones share the same map.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<HashMap<Bytes, Bytes>>>,
}

impl Store {
    pub fn new() -> Store {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Binds `value` to `key`, replacing whatever was there. The last write to complete wins.
    /// Keys are compared byte for byte.
    pub fn write(&self, key: Bytes, value: Bytes) {
        // A panic while holding the lock can't leave the map half-updated, so a poisoned lock is
        // still safe to use.
        let mut keys = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        keys.insert(key, value);
    }

    /// Returns the value bound to `key`, or empty bytes if it was never written. A missing key
    /// and a key holding an empty value look the same.
    pub fn read(&self, key: &[u8]) -> Bytes {
        let keys = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        keys.get(key).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

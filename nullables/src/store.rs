//! Nullable store: an in-memory store whose writes can be switched off.

use std::sync::atomic::{AtomicBool, Ordering};
use triad_store::{KvStore, MemoryStore, StoreError};

/// A [`MemoryStore`] with a failure switch, for exercising the node's
/// persistence error path.
#[derive(Default)]
pub struct NullStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

impl KvStore for NullStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("writes disabled".into()));
        }
        self.inner.put(key, value)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get(key)
    }

    fn iterate_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        self.inner.iterate_prefix(prefix)
    }
}

//! In-Process Store Backend
//!
//! A mutex-guarded map with per-entry expiry. Strictly single-process
//! consistent: under a multi-instance deployment, rate limits and session
//! caches kept here become per-instance.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::cache::{CacheEntry, StoreBackend, StoreError, MEMORY_SWEEP_THRESHOLD};

// == Memory Store ==
/// In-process map backend.
///
/// The mutex is scoped to the map and held only for the duration of the
/// map operation; this backend performs no I/O, so no call ever blocks
/// beyond lock contention.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    sweep_threshold: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store with the default sweep threshold.
    pub fn new() -> Self {
        Self::with_sweep_threshold(MEMORY_SWEEP_THRESHOLD)
    }

    /// Creates an empty store sweeping expired entries whenever the live
    /// entry count exceeds `sweep_threshold` on a write.
    pub fn with_sweep_threshold(sweep_threshold: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sweep_threshold,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map itself is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Sweep Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed. Also driven periodically by
    /// the background sweep task.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                // A read past expiry behaves as if the key never existed
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl_seconds));

        if entries.len() > self.sweep_threshold {
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired());
            debug!(
                removed = before - entries.len(),
                "memory store over threshold, swept expired entries"
            );
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str, ttl_seconds: u64) -> Result<u64, StoreError> {
        let mut entries = self.lock();

        // An expired counter starts a fresh window
        if entries.get(key).map(|e| e.is_expired()).unwrap_or(false) {
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(entry) => {
                // Non-numeric contents reset to zero rather than error
                let current: u64 = entry.value.parse().unwrap_or(0);
                let next = current + 1;
                entry.value = next.to_string();
                Ok(next)
            }
            None => {
                entries.insert(key.to_string(), CacheEntry::new("1".to_string(), ttl_seconds));
                Ok(1)
            }
        }
    }
}

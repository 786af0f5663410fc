//! Store Backend Contract
//!
//! The capability set every cache backend must provide. Exactly two
//! implementations exist, selected once at process start: the external
//! shared store and the in-process map.

use async_trait::async_trait;
use thiserror::Error;

// == Store Error ==
/// Failure of a backend call.
///
/// These never reach HTTP clients: the cache service converts them to a
/// miss or a best-effort no-op, and the rate limiter's fail-open branch
/// handles the one operation that surfaces them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend rejected or failed the call
    #[error("store backend error: {0}")]
    Backend(String),

    /// The call did not complete within the operation timeout
    #[error("store call timed out")]
    Timeout,
}

// == Store Backend Trait ==
/// Uniform get/set/delete/atomic-increment interface over a key-value
/// store with per-key expiry.
///
/// All TTLs are in seconds and must be > 0. Implementations must be safe
/// for concurrent invocation from arbitrarily many requests, and `incr`
/// on a single key must be linearizable: N concurrent callers receive N
/// distinct consecutive integers.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Reads a key. Expired entries behave as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a key, overwriting any existing entry and resetting its expiry.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Removes a key. Idempotent; absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically increments a counter and returns the post-increment value.
    ///
    /// An absent or expired key initializes to 0 before the increment and
    /// arms the TTL from this call; a live key increments without resetting
    /// its TTL, so the expiry marks the fixed window's end.
    async fn incr(&self, key: &str, ttl_seconds: u64) -> Result<u64, StoreError>;
}

// Lets a shared backend double as the boxed store, e.g. the in-process
// map also held by the sweep task
#[async_trait]
impl<T: StoreBackend + ?Sized> StoreBackend for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }

    async fn incr(&self, key: &str, ttl_seconds: u64) -> Result<u64, StoreError> {
        (**self).incr(key, ttl_seconds).await
    }
}

//! Cache Service
//!
//! Process-wide facade over the selected store backend. Constructed once at
//! startup and shared by reference with every consumer.
//!
//! Degrade policy: the cache is an accelerator, never a dependency. Backend
//! failures on reads become misses and failures on writes become no-ops,
//! logged but never propagated, so a down store tier degrades service
//! without blocking it. The one exception is `incr`, which surfaces its
//! error to let the rate limiter take its own explicit fail-open branch.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::cache::{StoreBackend, StoreError};

// == Cache Service ==
/// Shared cache facade. The backend is chosen once at process start and
/// fixed for the process lifetime.
pub struct CacheService {
    backend: Box<dyn StoreBackend>,
}

impl CacheService {
    // == Constructor ==
    pub fn new(backend: Box<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    // == Get ==
    /// Reads and decodes a JSON payload.
    ///
    /// Backend errors and undecodable payloads degrade to `None`: a cache
    /// miss is the universal fallback, and the caller re-derives the value
    /// from the source of truth.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key, error = %e, "cache payload undecodable, treating as miss");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!(key, error = %e, "cache get failed, treating as miss");
                None
            }
        }
    }

    // == Set ==
    /// Encodes and writes a JSON payload with the given TTL. Best-effort:
    /// failures are logged and swallowed.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!(key, error = %e, "cache payload not serializable, skipping set");
                return;
            }
        };
        if let Err(e) = self.backend.set(key, &raw, ttl_seconds).await {
            error!(key, error = %e, "cache set failed, skipping");
        }
    }

    // == Delete ==
    /// Removes a key. Idempotent and best-effort.
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            error!(key, error = %e, "cache delete failed, skipping");
        }
    }

    // == Incr ==
    /// Atomically increments a counter, arming the TTL on window start.
    ///
    /// Unlike the other operations this surfaces the backend error: the
    /// rate limiter owns the fail-open decision and tests simulate backend
    /// failure through it deterministically.
    pub async fn incr(&self, key: &str, ttl_seconds: u64) -> Result<u64, StoreError> {
        self.backend.incr(key, ttl_seconds).await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use async_trait::async_trait;
    use serde::Deserialize;

    /// Backend whose every call fails, for exercising the degrade policy.
    struct FailingStore;

    #[async_trait]
    impl StoreBackend for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn incr(&self, _key: &str, _ttl: u64) -> Result<u64, StoreError> {
            Err(StoreError::Timeout)
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let cache = CacheService::new(Box::new(MemoryStore::new()));
        let payload = Payload {
            name: "leads".to_string(),
            count: 3,
        };

        cache.set_json("payload", &payload, 300).await;
        let restored: Option<Payload> = cache.get_json("payload").await;

        assert_eq!(restored, Some(payload));
    }

    #[tokio::test]
    async fn test_get_miss_returns_none() {
        let cache = CacheService::new(Box::new(MemoryStore::new()));
        let missing: Option<Payload> = cache.get_json("absent").await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_payload_degrades_to_miss() {
        let store = MemoryStore::new();
        store.set("payload", "not json", 300).await.unwrap();

        let cache = CacheService::new(Box::new(store));
        let restored: Option<Payload> = cache.get_json("payload").await;
        assert!(restored.is_none());
    }

    #[tokio::test]
    async fn test_backend_errors_degrade_to_miss_and_noop() {
        let cache = CacheService::new(Box::new(FailingStore));

        // Reads degrade to miss, writes to no-op; neither panics or errors
        let missing: Option<Payload> = cache.get_json("k").await;
        assert!(missing.is_none());
        cache
            .set_json(
                "k",
                &Payload {
                    name: "x".to_string(),
                    count: 0,
                },
                300,
            )
            .await;
        cache.delete("k").await;
    }

    #[tokio::test]
    async fn test_incr_surfaces_backend_error() {
        let cache = CacheService::new(Box::new(FailingStore));
        assert!(cache.incr("k", 60).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_payload() {
        let cache = CacheService::new(Box::new(MemoryStore::new()));
        let payload = Payload {
            name: "x".to_string(),
            count: 1,
        };

        cache.set_json("payload", &payload, 300).await;
        cache.delete("payload").await;

        let restored: Option<Payload> = cache.get_json("payload").await;
        assert!(restored.is_none());
    }
}

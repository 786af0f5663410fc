//! External Store Backend
//!
//! Redis-protocol backend over a multiplexed async connection. Using a
//! shared store keeps rate counters and session entries correct across
//! multiple backend instances.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::time::timeout;

use crate::cache::{StoreBackend, StoreError};

// == Redis Config ==
/// Connection parameters for the external store.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. "redis://localhost:6379"
    pub url: String,
    /// Bound on establishing the connection at startup
    pub connect_timeout: Duration,
    /// Bound on every individual store call, so a slow store cannot stall
    /// the rate limiter's fail-open decision indefinitely
    pub operation_timeout: Duration,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(2),
        }
    }
}

// == Redis Store ==
/// Redis-backed store. `incr` relies on the native atomic INCR, which
/// holds across processes.
pub struct RedisStore {
    conn: MultiplexedConnection,
    operation_timeout: Duration,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to the external store. Failing here triggers the caller's
    /// fallback to the in-process backend.
    pub async fn connect(config: RedisConfig) -> Result<Self, StoreError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| StoreError::Backend(e.to_string()))?;

        let conn = timeout(
            config.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| StoreError::Timeout)?
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            conn,
            operation_timeout: config.operation_timeout,
        })
    }

    /// Runs one store call under the operation timeout.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Backend(e.to_string())),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl StoreBackend for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.get(key).await }).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.set_ex(key, value, ttl_seconds).await })
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded::<(), _>(async move { conn.del(key).await })
            .await
    }

    async fn incr(&self, key: &str, ttl_seconds: u64) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(async move {
            let count: u64 = conn.incr(key, 1u64).await?;
            // First increment of the window arms the expiry; later ones
            // leave it alone so the window end stays fixed
            if count == 1 {
                let _: bool = conn.expire(key, ttl_seconds as i64).await?;
            }
            Ok(count)
        })
        .await
    }
}

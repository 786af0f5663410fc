//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from the
//! in-process store backend. Only spawned when that backend is selected;
//! the external store expires keys natively.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns the periodic expiry sweep.
///
/// The returned handle is aborted during graceful shutdown.
pub fn spawn_sweep_task(store: Arc<MemoryStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.sweep_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StoreBackend;

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        store.set("expire_soon", "value", 1).await.unwrap();

        let handle = spawn_sweep_task(Arc::clone(&store), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(store.len(), 0, "Expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let store = Arc::new(MemoryStore::new());
        store.set("long_lived", "value", 3600).await.unwrap();

        let handle = spawn_sweep_task(Arc::clone(&store), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            store.get("long_lived").await.unwrap().as_deref(),
            Some("value")
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let store = Arc::new(MemoryStore::new());

        let handle = spawn_sweep_task(store, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}

//! Expiry Sweep Task
//!
//! Background task that periodically reaps expired values from the
//! in-memory store. Like a Redis server's own expiry, it never touches the
//! tracking queue; stale queue entries are left for eviction-time repair.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically removes expired store values.
///
/// # Arguments
/// * `store` - shared in-memory store
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_expiry_sweep(store: Arc<MemoryStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired values", removed);
            } else {
                debug!("Expiry sweep: no expired values found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;

    #[tokio::test]
    async fn test_sweep_removes_expired_values() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_with_expiry("expire_soon", b"v".to_vec(), Some(1))
            .await
            .unwrap();
        store.push_tail("trackKeyList", "expire_soon").await.unwrap();

        let handle = spawn_expiry_sweep(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Value reaped, queue entry left behind for repair
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.range_from_head("trackKeyList", 0, 10).await.unwrap(),
            vec!["expire_soon"]
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_values() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_with_expiry("long_lived", b"v".to_vec(), Some(3600))
            .await
            .unwrap();

        let handle = spawn_expiry_sweep(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("long_lived").await.unwrap(), Some(b"v".to_vec()));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let store = Arc::new(MemoryStore::new());

        let handle = spawn_expiry_sweep(store, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}

//! Cache Engine Module
//!
//! Capacity-bounded cache over a [`KeyValueStore`]. Values live in the store
//! with their TTLs; the engine adds capacity accounting, the eviction policy
//! and upkeep of the tracking queue that drives eviction order.
//!
//! The engine takes no lock of its own unless `serialize_puts` is set. Every
//! step of a put is a separate store call, so concurrent puts near capacity
//! may each evict a victim.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::keyspace::parse_key_count;
use crate::cache::{
    CacheConfig, CacheStats, EvictionPolicy, QueueEnd, StatsRecorder, TrackingQueue,
    MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result};
use crate::store::{KeyValueStore, RedisStore};

// == Stored Object ==
/// A key and the value written under it, as returned by `put`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub value: Value,
}

// == Cache Engine ==
/// Cache engine owning the eviction policy and the tracking queue convention.
pub struct CacheEngine {
    /// Backing store, shared with the tracking queue
    store: Arc<dyn KeyValueStore>,
    /// Insertion-order index kept inside the store
    queue: TrackingQueue,
    config: CacheConfig,
    stats: StatsRecorder,
    /// Present only when puts are serialized
    put_lock: Option<Mutex<()>>,
}

impl CacheEngine {
    // == Constructor ==
    /// Builds an engine over an existing store.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let queue = TrackingQueue::new(
            store.clone(),
            config.queue_key.clone(),
            config.repair_batch_size,
        );
        let put_lock = config.serialize_puts.then(|| Mutex::new(()));

        Ok(Self {
            store,
            queue,
            config,
            stats: StatsRecorder::new(),
            put_lock,
        })
    }

    // == Configure ==
    /// Connects to the Redis server at `host:port` and builds an engine over it.
    ///
    /// Every call opens a fresh connection; callers replace their previous
    /// engine with the returned one.
    pub async fn configure(host: &str, port: u16, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let store = RedisStore::connect(host, port).await?;
        info!(
            "Cache engine configured: store={}:{}, capacity={}, default_ttl={:?}, policy={}",
            host, port, config.capacity, config.default_ttl, config.policy
        );
        Self::new(Arc::new(store), config)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn tracking_queue(&self) -> &TrackingQueue {
        &self.queue
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Resident Count ==
    /// Approximate number of cached entries, excluding the queue's own key.
    pub async fn resident_count(&self) -> Result<u64> {
        let info = self.store.keyspace_info().await?;
        let keys = parse_key_count(&info)?;
        Ok(keys.saturating_sub(1))
    }

    // == Get ==
    /// Returns the serialized value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<String> {
        self.validate_key(key)?;

        match self.store.get(key).await? {
            Some(bytes) => {
                self.stats.record_hit();
                String::from_utf8(bytes).map_err(|e| {
                    CacheError::Internal(format!("Stored value for {} is not UTF-8: {}", key, e))
                })
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Put ==
    /// Stores `value` under `key`, evicting first if the cache is full.
    ///
    /// The TTL is `ttl_override`, else the configured default, else none.
    /// Not atomic: a put abandoned mid-way may have evicted its victim
    /// without writing the new value.
    pub async fn put(
        &self,
        key: &str,
        value: Value,
        ttl_override: Option<u64>,
    ) -> Result<StoredObject> {
        self.validate_key(key)?;
        let payload = serde_json::to_vec(&value)?;

        let _guard = match &self.put_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let resident = self.resident_count().await?;
        if resident >= self.config.capacity {
            self.make_room(key, resident).await?;
        }

        let ttl = self.config.resolve_ttl(ttl_override);
        self.store.set_with_expiry(key, payload, ttl).await?;
        // Appended only once the value is written
        self.queue.append(key).await?;
        debug!("Stored {} (ttl={:?})", key, ttl);

        Ok(StoredObject {
            key: key.to_string(),
            value,
        })
    }

    // == Delete ==
    /// Removes `key` from the store and every occurrence of it from the queue.
    pub async fn delete(&self, key: &str) -> Result<String> {
        self.validate_key(key)?;

        if self.store.delete(key).await? == 0 {
            return Err(CacheError::NotFound(key.to_string()));
        }
        let forgotten = self.queue.forget(key).await?;
        debug!("Deleted {} ({} queue entries removed)", key, forgotten);

        Ok(key.to_string())
    }

    // == Eviction ==
    /// Applies the eviction policy for an incoming put of `key`.
    async fn make_room(&self, key: &str, resident: u64) -> Result<()> {
        match self.config.policy {
            EvictionPolicy::Reject => {
                self.stats.record_rejection();
                warn!(
                    "Rejected put of {}: {} resident entries, capacity {}",
                    key, resident, self.config.capacity
                );
                Err(CacheError::StorageFull(key.to_string()))
            }
            EvictionPolicy::OldestFirst => {
                self.repair(QueueEnd::Head).await?;
                self.evict_from(QueueEnd::Head).await
            }
            EvictionPolicy::NewestFirst => {
                // Head repair keeps the queue healthy; the victim comes from the tail
                self.repair(QueueEnd::Head).await?;
                self.repair(QueueEnd::Tail).await?;
                self.evict_from(QueueEnd::Tail).await
            }
        }
    }

    async fn repair(&self, end: QueueEnd) -> Result<()> {
        let report = self.queue.repair(end).await?;
        self.stats.record_stale_purged(report.purged);
        self.stats.record_displaced(report.displaced);
        Ok(())
    }

    /// Pops a victim from `end` and deletes it. An already-gone victim is fine.
    async fn evict_from(&self, end: QueueEnd) -> Result<()> {
        let Some(victim) = self.queue.pop(end).await? else {
            warn!("Cache at capacity but tracking queue is empty; nothing to evict");
            return Ok(());
        };

        if self.store.delete(&victim).await? > 0 {
            self.stats.record_eviction();
            info!("Evicted {} from queue {:?}", victim, end);
        } else {
            debug!("Eviction victim {} was already gone", victim);
        }
        Ok(())
    }

    // == Validation ==
    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if key == self.queue.key() {
            return Err(CacheError::InvalidRequest(format!(
                "Key {} is reserved for the tracking queue",
                key
            )));
        }
        Ok(())
    }
}

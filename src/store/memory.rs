//! In-Memory Store Module
//!
//! A process-local [`KeyValueStore`] that mirrors the parts of Redis the
//! cache engine depends on: lazy per-key expiry, one shared namespace for
//! values and lists, lists that vanish once emptied, and `INFO keyspace`
//! style introspection.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entry::{current_timestamp_ms, StoredEntry};
use super::KeyValueStore;
use crate::error::Result;

#[derive(Debug, Default)]
struct Inner {
    /// String values keyed by name
    entries: HashMap<String, StoredEntry>,
    /// Lists keyed by name; front = head, back = tail
    lists: HashMap<String, VecDeque<String>>,
    /// Entries carrying an expiry deadline, expired or not
    expiring: usize,
}

impl Inner {
    fn insert_entry(&mut self, key: &str, entry: StoredEntry) {
        if entry.expires_at.is_some() {
            self.expiring += 1;
        }
        if let Some(old) = self.entries.insert(key.to_string(), entry) {
            self.forget_expiry(&old);
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<StoredEntry> {
        let removed = self.entries.remove(key)?;
        self.forget_expiry(&removed);
        Some(removed)
    }

    fn forget_expiry(&mut self, entry: &StoredEntry) {
        if entry.expires_at.is_some() {
            self.expiring = self.expiring.saturating_sub(1);
        }
    }

    /// Drops `key` if it has expired, returning whether a live value remains.
    fn live_entry(&mut self, key: &str) -> Option<&StoredEntry> {
        if self.entries.get(key).is_some_and(StoredEntry::is_expired) {
            self.remove_entry(key);
        }
        self.entries.get(key)
    }

    fn purge_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let purged = before - self.entries.len();
        // Only entries with a deadline can expire
        self.expiring = self.expiring.saturating_sub(purged);
        purged
    }

    fn pop(&mut self, list: &str, from_head: bool) -> Option<String> {
        let items = self.lists.get_mut(list)?;
        let popped = if from_head {
            items.pop_front()
        } else {
            items.pop_back()
        };
        if items.is_empty() {
            self.lists.remove(list);
        }
        popped
    }
}

// == Memory Store ==
/// Thread-safe in-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired values, returning how many were dropped.
    ///
    /// This is the store reaping keys on its own schedule; list entries that
    /// reference the dropped keys are left untouched.
    pub async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }

    // == Length ==
    /// Number of keys in the namespace, lists included.
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.entries.len() + inner.lists.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    /// Counts keys without reaping them, as Redis does: expired values stay
    /// counted until a read or the sweep removes them.
    async fn keyspace_info(&self) -> Result<String> {
        let inner = self.inner.read().await;

        let keys = inner.entries.len() + inner.lists.len();
        if keys == 0 {
            return Ok("# Keyspace\r\n".to_string());
        }

        Ok(format!(
            "# Keyspace\r\ndb0:keys={},expires={},avg_ttl=0\r\n",
            keys, inner.expiring
        ))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut inner = self.inner.write().await;
        Ok(inner.live_entry(key).map(|entry| entry.value.clone()))
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_secs: Option<u64>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        // A string write replaces whatever lived under the name, lists included
        inner.lists.remove(key);
        inner.insert_entry(key, StoredEntry::new(value, ttl_secs));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let removed_value = inner.live_entry(key).is_some() && inner.remove_entry(key).is_some();
        let removed_list = inner.lists.remove(key).is_some();
        Ok(u64::from(removed_value) + u64::from(removed_list))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.live_entry(key).is_some() || inner.lists.contains_key(key))
    }

    async fn push_tail(&self, list: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.remove_entry(list);
        inner
            .lists
            .entry(list.to_string())
            .or_default()
            .push_back(value.to_string());
        Ok(())
    }

    async fn pop_head(&self, list: &str) -> Result<Option<String>> {
        Ok(self.inner.write().await.pop(list, true))
    }

    async fn pop_tail(&self, list: &str) -> Result<Option<String>> {
        Ok(self.inner.write().await.pop(list, false))
    }

    async fn range_from_head(&self, list: &str, start: usize, end: usize) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .get(list)
            .map(|items| {
                items
                    .iter()
                    .skip(start)
                    .take(end.saturating_sub(start))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn range_from_tail(&self, list: &str, start: usize, end: usize) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .get(list)
            .map(|items| {
                items
                    .iter()
                    .rev()
                    .skip(start)
                    .take(end.saturating_sub(start))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn remove_all(&self, list: &str, value: &str) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let Some(items) = inner.lists.get_mut(list) else {
            return Ok(0);
        };
        let before = items.len();
        items.retain(|item| item != value);
        let removed = (before - items.len()) as u64;
        if items.is_empty() {
            inner.lists.remove(list);
        }
        Ok(removed)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn list(store: &MemoryStore, name: &str) -> Vec<String> {
        store.range_from_head(name, 0, usize::MAX).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();

        store
            .set_with_expiry("key1", b"value1".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(store.get("key1").await.unwrap(), Some(b"value1".to_vec()));
        assert!(store.exists("key1").await.unwrap());

        assert_eq!(store.delete("key1").await.unwrap(), 1);
        assert_eq!(store.delete("key1").await.unwrap(), 0);
        assert_eq!(store.get("key1").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_value_is_absent() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("short", b"v".to_vec(), Some(1))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(!store.exists("short").await.unwrap());
        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.delete("short").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("short", b"v".to_vec(), Some(1))
            .await
            .unwrap();
        store
            .set_with_expiry("long", b"v".to_vec(), Some(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_keyspace_info_empty() {
        let store = MemoryStore::new();
        let info = store.keyspace_info().await.unwrap();
        assert!(!info.contains("keys="));
    }

    #[tokio::test]
    async fn test_keyspace_info_counts_lists() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("a", b"1".to_vec(), Some(60))
            .await
            .unwrap();
        store.set_with_expiry("b", b"2".to_vec(), None).await.unwrap();
        store.push_tail("queue", "a").await.unwrap();

        let info = store.keyspace_info().await.unwrap();
        assert!(info.contains("db0:keys=3,expires=1,"), "got {info}");
    }

    #[tokio::test]
    async fn test_keyspace_info_does_not_reap() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("short", b"v".to_vec(), Some(1))
            .await
            .unwrap();
        store.set_with_expiry("kept", b"v".to_vec(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        // Expired but unread: still counted, still held
        let info = store.keyspace_info().await.unwrap();
        assert!(info.contains("db0:keys=2,expires=1,"), "got {info}");
        assert_eq!(store.len().await, 2);

        // A read reaps it and the counters follow
        assert_eq!(store.get("short").await.unwrap(), None);
        let info = store.keyspace_info().await.unwrap();
        assert!(info.contains("db0:keys=1,expires=0,"), "got {info}");
    }

    #[tokio::test]
    async fn test_expires_count_tracks_overwrites() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("k", b"1".to_vec(), Some(60))
            .await
            .unwrap();
        store.set_with_expiry("k", b"2".to_vec(), None).await.unwrap();
        store
            .set_with_expiry("j", b"1".to_vec(), Some(60))
            .await
            .unwrap();
        store.delete("j").await.unwrap();

        let info = store.keyspace_info().await.unwrap();
        assert!(info.contains("db0:keys=1,expires=0,"), "got {info}");
    }

    #[tokio::test]
    async fn test_list_push_pop_both_ends() {
        let store = MemoryStore::new();
        for key in ["a", "b", "c"] {
            store.push_tail("q", key).await.unwrap();
        }

        assert_eq!(store.pop_head("q").await.unwrap(), Some("a".to_string()));
        assert_eq!(store.pop_tail("q").await.unwrap(), Some("c".to_string()));
        assert_eq!(list(&store, "q").await, vec!["b"]);

        assert_eq!(store.pop_tail("q").await.unwrap(), Some("b".to_string()));
        assert_eq!(store.pop_head("q").await.unwrap(), None);
        // Emptied lists disappear from the namespace
        assert!(!store.exists("q").await.unwrap());
    }

    #[tokio::test]
    async fn test_ranges_are_half_open() {
        let store = MemoryStore::new();
        for key in ["a", "b", "c", "d", "e"] {
            store.push_tail("q", key).await.unwrap();
        }

        assert_eq!(store.range_from_head("q", 0, 2).await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.range_from_head("q", 3, 10).await.unwrap(), vec!["d", "e"]);
        assert_eq!(store.range_from_tail("q", 0, 2).await.unwrap(), vec!["e", "d"]);
        assert_eq!(store.range_from_tail("q", 4, 9).await.unwrap(), vec!["a"]);
        assert!(store.range_from_head("q", 2, 2).await.unwrap().is_empty());
        assert!(store.range_from_head("missing", 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_all_occurrences() {
        let store = MemoryStore::new();
        for key in ["a", "b", "a", "c", "a"] {
            store.push_tail("q", key).await.unwrap();
        }

        assert_eq!(store.remove_all("q", "a").await.unwrap(), 3);
        assert_eq!(list(&store, "q").await, vec!["b", "c"]);
        assert_eq!(store.remove_all("q", "zzz").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_list_key() {
        let store = MemoryStore::new();
        store.push_tail("q", "a").await.unwrap();

        assert_eq!(store.delete("q").await.unwrap(), 1);
        assert!(list(&store, "q").await.is_empty());
    }
}

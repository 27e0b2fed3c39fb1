//! Redis Store Module
//!
//! [`KeyValueStore`] backed by a Redis server. A single
//! [`ConnectionManager`] is shared by every request; it multiplexes
//! commands and reconnects on its own.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use super::KeyValueStore;
use crate::error::Result;

// == Redis Store ==
/// Redis-backed key-value store.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    addr: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").field("addr", &self.addr).finish()
    }
}

impl RedisStore {
    // == Connect ==
    /// Opens a managed connection to `host:port`.
    ///
    /// Fails with `StoreUnavailable` when the server cannot be reached.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        let client = redis::Client::open(format!("redis://{}/", addr))?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis at {}", addr);
        Ok(Self { manager, addr })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

/// Translates a half-open range into inclusive LRANGE bounds, `None` when empty.
fn inclusive_bounds(start: usize, end: usize) -> Option<(isize, isize)> {
    if end <= start {
        return None;
    }
    let start = isize::try_from(start).unwrap_or(isize::MAX);
    let stop = isize::try_from(end - 1).unwrap_or(isize::MAX);
    Some((start, stop))
}

/// Inclusive LRANGE bounds for a half-open range counted from the tail.
///
/// Index `i` from the tail is `-(i + 1)` from the head, so the far end of the
/// range becomes the lower bound.
fn tail_bounds(start: usize, end: usize) -> Option<(isize, isize)> {
    let (start, stop) = inclusive_bounds(start, end)?;
    Some((-stop.saturating_add(1), -start.saturating_add(1)))
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn keyspace_info(&self) -> Result<String> {
        let mut con = self.conn();
        let info: String = redis::cmd("INFO")
            .arg("keyspace")
            .query_async(&mut con)
            .await?;
        Ok(info)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut con = self.conn();
        let value: Option<Vec<u8>> = con.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_secs: Option<u64>,
    ) -> Result<()> {
        let mut con = self.conn();
        let _: () = match ttl_secs {
            Some(ttl) => con.set_ex(key, value, ttl).await?,
            None => con.set(key, value).await?,
        };
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut con = self.conn();
        let removed: u64 = con.del(key).await?;
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut con = self.conn();
        let found: bool = con.exists(key).await?;
        Ok(found)
    }

    async fn push_tail(&self, list: &str, value: &str) -> Result<()> {
        let mut con = self.conn();
        let _: u64 = con.rpush(list, value).await?;
        Ok(())
    }

    async fn pop_head(&self, list: &str) -> Result<Option<String>> {
        let mut con = self.conn();
        let popped: Option<String> = con.lpop(list, None).await?;
        Ok(popped)
    }

    async fn pop_tail(&self, list: &str) -> Result<Option<String>> {
        let mut con = self.conn();
        let popped: Option<String> = con.rpop(list, None).await?;
        Ok(popped)
    }

    async fn range_from_head(&self, list: &str, start: usize, end: usize) -> Result<Vec<String>> {
        let Some((start, stop)) = inclusive_bounds(start, end) else {
            return Ok(Vec::new());
        };
        let mut con = self.conn();
        let items: Vec<String> = con.lrange(list, start, stop).await?;
        Ok(items)
    }

    async fn range_from_tail(&self, list: &str, start: usize, end: usize) -> Result<Vec<String>> {
        let Some((lower, upper)) = tail_bounds(start, end) else {
            return Ok(Vec::new());
        };
        let mut con = self.conn();
        let mut items: Vec<String> = con.lrange(list, lower, upper).await?;
        items.reverse();
        Ok(items)
    }

    async fn remove_all(&self, list: &str, value: &str) -> Result<u64> {
        let mut con = self.conn();
        let removed: u64 = con.lrem(list, 0, value).await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_bounds() {
        assert_eq!(inclusive_bounds(0, 1000), Some((0, 999)));
        assert_eq!(inclusive_bounds(5, 6), Some((5, 5)));
        assert_eq!(inclusive_bounds(3, 3), None);
        assert_eq!(inclusive_bounds(4, 2), None);
    }

    #[test]
    fn test_tail_bounds() {
        assert_eq!(tail_bounds(0, 1000), Some((-1000, -1)));
        assert_eq!(tail_bounds(0, 1), Some((-1, -1)));
        assert_eq!(tail_bounds(2, 5), Some((-5, -3)));
        assert_eq!(tail_bounds(3, 3), None);
        assert_eq!(tail_bounds(0, usize::MAX), Some((-isize::MAX, -1)));
    }
}

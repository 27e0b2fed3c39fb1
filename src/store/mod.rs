//! Store Module
//!
//! The key-value store capability the cache engine orchestrates. The engine
//! only ever talks to a [`KeyValueStore`]; persistence, expiry timing and
//! list storage belong to the backend.
//!
//! # Backends
//! - [`RedisStore`] - a Redis server reached through a shared connection manager
//! - [`MemoryStore`] - an in-process store with the same observable contract

mod entry;
mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use entry::StoredEntry;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == Key Value Store ==
/// Storage capability consumed by the cache engine.
///
/// Implementations must be safe for concurrent use. Each call is expected to
/// be individually atomic; the engine never asks for cross-call transactions.
///
/// List ranges are half-open: `[start, end)`, counted from the end named by
/// the method. `range_from_tail` returns elements tail-first.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Keyspace introspection text (Redis `INFO keyspace` format).
    ///
    /// An empty store has no `db0:keys=` line at all.
    async fn keyspace_info(&self) -> Result<String>;

    /// Reads a value, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes a value, replacing any previous one. `None` means no expiry.
    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl_secs: Option<u64>)
        -> Result<()>;

    /// Deletes a key, returning how many keys were removed.
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Whether a key is currently present.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Appends a value at the tail of a list, creating it if needed.
    async fn push_tail(&self, list: &str, value: &str) -> Result<()>;

    /// Pops the head of a list.
    async fn pop_head(&self, list: &str) -> Result<Option<String>>;

    /// Pops the tail of a list.
    async fn pop_tail(&self, list: &str) -> Result<Option<String>>;

    /// Reads `[start, end)` counted from the head, in head-to-tail order.
    async fn range_from_head(&self, list: &str, start: usize, end: usize) -> Result<Vec<String>>;

    /// Reads `[start, end)` counted from the tail, in tail-to-head order.
    async fn range_from_tail(&self, list: &str, start: usize, end: usize) -> Result<Vec<String>>;

    /// Removes every occurrence of `value` from a list.
    async fn remove_all(&self, list: &str, value: &str) -> Result<u64>;
}

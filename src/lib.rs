//! Tracking Cache - A capacity-bounded cache over a key-value store
//!
//! Keeps insertion order in a tracking queue inside the store and evicts
//! oldest-first, newest-first, or rejects writes once capacity is reached.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, CacheEngine, EvictionPolicy};
pub use config::{Config, StoreBackend};
pub use error::{CacheError, Result};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use tasks::spawn_expiry_sweep;

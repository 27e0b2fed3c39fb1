//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{
    CacheConfig, EvictionPolicy, DEFAULT_CAPACITY, DEFAULT_REPAIR_BATCH_SIZE, DEFAULT_TTL_SECONDS,
    TRACKING_QUEUE_KEY,
};

/// Which store implementation backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// A Redis server at `store_host:store_port`
    #[default]
    Redis,
    /// The in-process store
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            other => Err(format!("Unknown store backend: {}", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store implementation
    pub store_backend: StoreBackend,
    /// Store host
    pub store_host: String,
    /// Store port
    pub store_port: u16,
    /// Maximum number of resident cache entries
    pub capacity: u64,
    /// Default TTL in seconds, 0 = no expiry
    pub default_ttl: u64,
    /// Policy applied at capacity
    pub eviction_policy: EvictionPolicy,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds (memory backend only)
    pub cleanup_interval: u64,
    /// Name of the tracking queue list
    pub queue_key: String,
    /// Keys read per queue repair batch
    pub repair_batch_size: usize,
    /// Serialize puts behind an engine-wide lock
    pub serialize_puts: bool,
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `HOST` - Store host (default: 127.0.0.1)
    /// - `CACHE_PORT` - Store port (default: 6379)
    /// - `NUMBER_OF_SLOTS` - Maximum resident entries (default: 10000)
    /// - `TTL_SECONDS` - Default TTL in seconds, 0 disables expiry (default: 3600)
    /// - `EVICTION_POLICY` - `OldestFirst`, `NewestFirst` or `Reject` (default: Reject)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Memory store sweep frequency in seconds (default: 1)
    /// - `QUEUE_KEY` - Tracking queue list name (default: trackKeyList)
    /// - `REPAIR_BATCH_SIZE` - Keys per repair read (default: 1000)
    /// - `SERIALIZE_PUTS` - Serialize eviction decisions (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_backend: env_or("STORE_BACKEND", defaults.store_backend),
            store_host: env::var("HOST")
                .ok()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.store_host),
            store_port: env_or("CACHE_PORT", defaults.store_port),
            capacity: env_or("NUMBER_OF_SLOTS", defaults.capacity),
            default_ttl: env_or("TTL_SECONDS", defaults.default_ttl),
            eviction_policy: env_or("EVICTION_POLICY", defaults.eviction_policy),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            queue_key: env::var("QUEUE_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .unwrap_or(defaults.queue_key),
            repair_batch_size: env_or("REPAIR_BATCH_SIZE", defaults.repair_batch_size),
            serialize_puts: env_or("SERIALIZE_PUTS", defaults.serialize_puts),
        }
    }

    /// Engine configuration derived from these settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(
            self.capacity,
            Some(self.default_ttl).filter(|&ttl| ttl > 0),
            self.eviction_policy,
        )
        .with_queue_key(self.queue_key.clone())
        .with_repair_batch_size(self.repair_batch_size)
        .with_serialized_puts(self.serialize_puts)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Redis,
            store_host: "127.0.0.1".to_string(),
            store_port: 6379,
            capacity: DEFAULT_CAPACITY,
            default_ttl: DEFAULT_TTL_SECONDS,
            eviction_policy: EvictionPolicy::Reject,
            server_port: 3000,
            cleanup_interval: 1,
            queue_key: TRACKING_QUEUE_KEY.to_string(),
            repair_batch_size: DEFAULT_REPAIR_BATCH_SIZE,
            serialize_puts: false,
        }
    }
}

//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheConfig, CacheStats, EvictionPolicy, StoredObject};

/// Response body for GET /cache/object/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Builds a response from the stored serialized form.
    ///
    /// Text that is not valid JSON is returned as a JSON string.
    pub fn from_stored(key: impl Into<String>, raw: String) -> Self {
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for POST /cache/object/:key
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    /// The key that was stored
    pub key: String,
    /// The value that was stored
    pub value: Value,
}

impl From<StoredObject> for PutResponse {
    fn from(stored: StoredObject) -> Self {
        Self {
            key: stored.key,
            value: stored.value,
        }
    }
}

/// Response body for DELETE /cache/object/:key/delete
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for PUT /cache/config
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureResponse {
    pub message: String,
    pub capacity: u64,
    pub default_ttl: Option<u64>,
    pub eviction_policy: EvictionPolicy,
}

impl ConfigureResponse {
    pub fn new(addr: &str, config: &CacheConfig) -> Self {
        Self {
            message: format!("Cache configured against {}", addr),
            capacity: config.capacity,
            default_ttl: config.default_ttl,
            eviction_policy: config.policy,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of puts refused at capacity
    pub rejections: u64,
    /// Number of stale queue entries removed by repair
    pub stale_purged: u64,
    /// Number of keys dropped from tracking by racing repairs
    pub displaced: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Entries currently resident in the store
    pub resident_entries: u64,
    /// Configured capacity
    pub capacity: u64,
    /// Configured eviction policy
    pub eviction_policy: EvictionPolicy,
}

impl StatsResponse {
    /// Creates a new StatsResponse from engine statistics
    pub fn new(stats: &CacheStats, resident_entries: u64, config: &CacheConfig) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            rejections: stats.rejections,
            stale_purged: stats.stale_purged,
            displaced: stats.displaced,
            hit_rate: stats.hit_rate(),
            resident_entries,
            capacity: config.capacity,
            eviction_policy: config.policy,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether an engine is configured and serving requests
    pub configured: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            configured,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

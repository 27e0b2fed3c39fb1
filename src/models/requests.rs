//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{CacheConfig, EvictionPolicy};

/// Request body for POST /cache/object/:key
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// Any JSON value; stored in serialized form
    pub value: Value,
}

/// Query string for POST /cache/object/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PutQuery {
    /// Optional TTL override in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Request body for PUT /cache/config
///
/// Omitted fields take the server's configured settings, not the previous request's.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureRequest {
    /// Store host
    pub host: String,
    /// Store port
    pub port: u16,
    /// Maximum resident entries
    #[serde(default)]
    pub capacity: Option<u64>,
    /// Default TTL in seconds, 0 disables expiry
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    /// Policy at capacity
    #[serde(default)]
    pub eviction_policy: Option<EvictionPolicy>,
}

impl ConfigureRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.host.trim().is_empty() {
            return Some("Host cannot be empty".to_string());
        }
        if self.capacity == Some(0) {
            return Some("Capacity must be a positive integer".to_string());
        }
        None
    }

    /// Engine configuration requested, layered over the server's `base` settings.
    ///
    /// Queue key, repair batch size and put serialization always come from `base`.
    pub fn cache_config(&self, base: &CacheConfig) -> CacheConfig {
        let mut config = base.clone();
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(ttl) = self.ttl_seconds {
            config.default_ttl = Some(ttl).filter(|&t| t > 0);
        }
        if let Some(policy) = self.eviction_policy {
            config.policy = policy;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_request_accepts_any_json() {
        let req: PutRequest = serde_json::from_str(r#"{"value": {"a": [1, 2]}}"#).unwrap();
        assert_eq!(req.value, json!({"a": [1, 2]}));

        let req: PutRequest = serde_json::from_str(r#"{"value": "plain"}"#).unwrap();
        assert_eq!(req.value, json!("plain"));
    }

    #[test]
    fn test_configure_request_defaults() {
        let req: ConfigureRequest =
            serde_json::from_str(r#"{"host": "localhost", "port": 6379}"#).unwrap();
        assert!(req.validate().is_none());

        let config = req.cache_config(&CacheConfig::default());
        assert_eq!(config.capacity, 10_000);
        assert_eq!(config.default_ttl, Some(3600));
        assert_eq!(config.policy, EvictionPolicy::Reject);
    }

    #[test]
    fn test_configure_request_overrides() {
        let req: ConfigureRequest = serde_json::from_str(
            r#"{"host": "cache", "port": 7000, "capacity": 5, "ttl_seconds": 0, "eviction_policy": "OldestFirst"}"#,
        )
        .unwrap();

        let config = req.cache_config(&CacheConfig::default());
        assert_eq!(config.capacity, 5);
        assert_eq!(config.default_ttl, None);
        assert_eq!(config.policy, EvictionPolicy::OldestFirst);
    }

    #[test]
    fn test_configure_request_keeps_server_settings() {
        let base = CacheConfig::new(50, None, EvictionPolicy::NewestFirst)
            .with_queue_key("orders:queue")
            .with_repair_batch_size(64)
            .with_serialized_puts(true);
        let req: ConfigureRequest =
            serde_json::from_str(r#"{"host": "cache", "port": 7000, "ttl_seconds": 30}"#).unwrap();

        let config = req.cache_config(&base);
        assert_eq!(config.capacity, 50);
        assert_eq!(config.default_ttl, Some(30));
        assert_eq!(config.policy, EvictionPolicy::NewestFirst);
        assert_eq!(config.queue_key, "orders:queue");
        assert_eq!(config.repair_batch_size, 64);
        assert!(config.serialize_puts);
    }

    #[test]
    fn test_validate_rejects_empty_host_and_zero_capacity() {
        let req = ConfigureRequest {
            host: " ".to_string(),
            port: 6379,
            capacity: None,
            ttl_seconds: None,
            eviction_policy: None,
        };
        assert!(req.validate().is_some());

        let req = ConfigureRequest {
            host: "localhost".to_string(),
            capacity: Some(0),
            ..req
        };
        assert!(req.validate().is_some());
    }
}

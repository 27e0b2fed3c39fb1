//! Eviction Policy Module
//!
//! Eviction policies and the immutable configuration an engine is built with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{
    DEFAULT_CAPACITY, DEFAULT_REPAIR_BATCH_SIZE, DEFAULT_TTL_SECONDS, TRACKING_QUEUE_KEY,
};
use crate::error::CacheError;

// == Eviction Policy ==
/// What `put` does when the cache is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Evict the earliest inserted live key (queue head)
    OldestFirst,
    /// Evict the latest inserted live key (queue tail)
    NewestFirst,
    /// Refuse the write with `StorageFull`
    #[default]
    Reject,
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "oldestfirst" | "oldest" => Ok(Self::OldestFirst),
            "newestfirst" | "newest" => Ok(Self::NewestFirst),
            "reject" => Ok(Self::Reject),
            _ => Err(CacheError::InvalidRequest(format!(
                "Unknown eviction policy: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OldestFirst => "OldestFirst",
            Self::NewestFirst => "NewestFirst",
            Self::Reject => "Reject",
        };
        f.write_str(name)
    }
}

// == Cache Config ==
/// Engine configuration, fixed for the lifetime of a `CacheEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum resident entries
    pub capacity: u64,
    /// TTL applied when `put` has no override, None = no expiry
    pub default_ttl: Option<u64>,
    /// Policy applied at capacity
    pub policy: EvictionPolicy,
    /// Name of the list holding the tracking queue
    pub queue_key: String,
    /// Keys read per repair batch
    pub repair_batch_size: usize,
    /// Hold an engine-wide lock across each put
    pub serialize_puts: bool,
}

impl CacheConfig {
    /// Config with the given capacity, default TTL and policy.
    pub fn new(capacity: u64, default_ttl: Option<u64>, policy: EvictionPolicy) -> Self {
        Self {
            capacity,
            default_ttl,
            policy,
            ..Self::default()
        }
    }

    pub fn with_queue_key(mut self, queue_key: impl Into<String>) -> Self {
        self.queue_key = queue_key.into();
        self
    }

    pub fn with_repair_batch_size(mut self, batch_size: usize) -> Self {
        self.repair_batch_size = batch_size;
        self
    }

    pub fn with_serialized_puts(mut self, serialize: bool) -> Self {
        self.serialize_puts = serialize;
        self
    }

    /// Checks the values an engine cannot run with.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidRequest(
                "Capacity must be a positive integer".to_string(),
            ));
        }
        if self.repair_batch_size == 0 {
            return Err(CacheError::InvalidRequest(
                "Repair batch size must be a positive integer".to_string(),
            ));
        }
        if self.queue_key.is_empty() {
            return Err(CacheError::InvalidRequest(
                "Tracking queue key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-call override, else the default; zero means no expiry.
    pub fn resolve_ttl(&self, ttl_override: Option<u64>) -> Option<u64> {
        ttl_override.or(self.default_ttl).filter(|&ttl| ttl > 0)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_ttl: Some(DEFAULT_TTL_SECONDS),
            policy: EvictionPolicy::Reject,
            queue_key: TRACKING_QUEUE_KEY.to_string(),
            repair_batch_size: DEFAULT_REPAIR_BATCH_SIZE,
            serialize_puts: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_variants() {
        assert_eq!("OldestFirst".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::OldestFirst);
        assert_eq!("oldest-first".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::OldestFirst);
        assert_eq!("newest_first".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::NewestFirst);
        assert_eq!("REJECT".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Reject);
        assert!("lru".parse::<EvictionPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [
            EvictionPolicy::OldestFirst,
            EvictionPolicy::NewestFirst,
            EvictionPolicy::Reject,
        ] {
            assert_eq!(policy.to_string().parse::<EvictionPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 10_000);
        assert_eq!(config.default_ttl, Some(3600));
        assert_eq!(config.policy, EvictionPolicy::Reject);
        assert_eq!(config.queue_key, "trackKeyList");
        assert_eq!(config.repair_batch_size, 1000);
        assert!(!config.serialize_puts);
    }

    #[test]
    fn test_resolve_ttl() {
        let config = CacheConfig::new(10, Some(60), EvictionPolicy::Reject);
        assert_eq!(config.resolve_ttl(Some(5)), Some(5));
        assert_eq!(config.resolve_ttl(None), Some(60));
        assert_eq!(config.resolve_ttl(Some(0)), None);

        let no_default = CacheConfig::new(10, None, EvictionPolicy::Reject);
        assert_eq!(no_default.resolve_ttl(None), None);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig::new(0, None, EvictionPolicy::Reject);
        assert!(matches!(config.validate(), Err(CacheError::InvalidRequest(_))));

        let config = CacheConfig::default().with_repair_batch_size(0);
        assert!(config.validate().is_err());
        assert!(CacheConfig::default().validate().is_ok());
    }
}

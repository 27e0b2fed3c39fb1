//! Cache Module
//!
//! Capacity-bounded caching over a key-value store, with insertion-order
//! eviction driven by a lazily repaired tracking queue.

mod engine;
mod keyspace;
mod policy;
mod queue;
mod stats;


// Re-export public types
pub use engine::{CacheEngine, StoredObject};
pub use keyspace::parse_key_count;
pub use policy::{CacheConfig, EvictionPolicy};
pub use queue::{QueueEnd, RepairReport, TrackingQueue};
pub use stats::{CacheStats, StatsRecorder};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Name of the list holding the tracking queue
pub const TRACKING_QUEUE_KEY: &str = "trackKeyList";

/// Resident entries allowed when no capacity is configured
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// TTL applied when neither the call nor the config names one
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Keys read per tracking-queue repair batch
pub const DEFAULT_REPAIR_BATCH_SIZE: usize = 1000;

//! Keyspace Introspection
//!
//! Reads the total key count out of `INFO keyspace` text.

use crate::error::{CacheError, Result};

/// Returns the `keys=<n>` value of the default namespace (`db0`).
///
/// A store with no keys reports no `db0` line at all; that reads as zero.
pub fn parse_key_count(info: &str) -> Result<u64> {
    let Some(segments) = info
        .lines()
        .find_map(|line| line.trim().strip_prefix("db0:"))
    else {
        return Ok(0);
    };

    match segments
        .split(',')
        .find_map(|segment| segment.strip_prefix("keys="))
    {
        Some(raw) => raw.trim().parse().map_err(|_| {
            CacheError::Internal(format!("Malformed keyspace key count: {}", raw))
        }),
        None => Ok(0),
    }
}

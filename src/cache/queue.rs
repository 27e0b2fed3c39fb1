//! Tracking Queue Module
//!
//! Insertion-order record of cached keys, stored as a list inside the
//! backing store. The queue is a lazily reconciled index: keys that expire
//! or are removed behind the engine's back stay queued until a repair pass
//! reaches them from the end being evicted.
//!
//! Repair assumes staleness is contiguous from the scanned end. It pops dead
//! keys until the first live one and never looks past it, so a pass costs
//! one existence check per stale key plus one for the live key that stops it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::store::KeyValueStore;

// == Queue End ==
/// Which end of the queue an operation works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEnd {
    /// Oldest insertions
    Head,
    /// Newest insertions
    Tail,
}

// == Tracking Queue ==
/// Handle to the tracking list in the store. Holds no keys itself.
#[derive(Clone)]
pub struct TrackingQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    batch_size: usize,
}

impl TrackingQueue {
    // == Constructor ==
    /// Creates a handle to the list named `key`, repairing `batch_size` keys per read.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, batch_size: usize) -> Self {
        Self {
            store,
            key: key.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Name of the list in the store.
    pub fn key(&self) -> &str {
        &self.key
    }

    // == Append ==
    /// Records a key at the tail. Duplicates are allowed.
    pub async fn append(&self, key: &str) -> Result<()> {
        self.store.push_tail(&self.key, key).await
    }

    // == Pop ==
    /// Removes and returns the key at `end`.
    pub async fn pop(&self, end: QueueEnd) -> Result<Option<String>> {
        match end {
            QueueEnd::Head => self.store.pop_head(&self.key).await,
            QueueEnd::Tail => self.store.pop_tail(&self.key).await,
        }
    }

    // == Forget ==
    /// Drops every occurrence of `key`, returning how many were queued.
    pub async fn forget(&self, key: &str) -> Result<u64> {
        self.store.remove_all(&self.key, key).await
    }

    // == Peek ==
    /// Reads up to `count` keys starting at `end`, ordered from that end inward.
    pub async fn peek(&self, end: QueueEnd, count: usize) -> Result<Vec<String>> {
        match end {
            QueueEnd::Head => self.store.range_from_head(&self.key, 0, count).await,
            QueueEnd::Tail => self.store.range_from_tail(&self.key, 0, count).await,
        }
    }

    // == Repair ==
    /// Pops stale keys from `end` until a live key sits there or the queue is empty.
    ///
    /// A concurrent repair can pop the dead key first, in which case this pass
    /// pops whatever replaced it. That key is reported as displaced; it is no
    /// longer tracked and will never be evicted.
    pub async fn repair(&self, end: QueueEnd) -> Result<RepairReport> {
        let mut report = RepairReport::default();

        'batches: loop {
            // Dead keys are popped as they are found, so each batch starts at offset 0
            let batch = self.peek(end, self.batch_size).await?;
            let exhausted = batch.len() < self.batch_size;

            for key in &batch {
                if self.store.exists(key).await? {
                    if report.purged > 0 {
                        debug!("Queue repair ({:?}) purged {} stale keys", end, report.purged);
                    }
                    return Ok(report);
                }

                match self.pop(end).await? {
                    Some(popped) if popped == *key => report.purged += 1,
                    Some(popped) => {
                        report.displaced += 1;
                        warn!(
                            "Queue {:?} changed during repair: expected {}, popped {}",
                            end, key, popped
                        );
                        // The rest of this batch is out of date
                        continue 'batches;
                    }
                    None => return Ok(report),
                }
            }

            if exhausted {
                debug!(
                    "Queue repair ({:?}) drained queue, purged {}",
                    end, report.purged
                );
                return Ok(report);
            }
        }
    }
}

// == Repair Report ==
/// Outcome of one repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Stale keys removed from the queue
    pub purged: usize,
    /// Keys popped in place of a stale key another repair had already removed
    pub displaced: usize,
}

//! # Predicate-Query Result Cache
//!
//! Caches full predicate query results keyed by predicate fingerprint.
//! Entries never expire by time; the only eviction is wholesale invalidation,
//! triggered by every successful mutation. The store exposes no way to tell
//! which cached predicate results a given mutation affects, so partial
//! invalidation would be unsound.
//!
//! Cached fingerprints are tracked in a list guarded by a coarse mutex held
//! only while the list itself is mutated or drained; the critical section is
//! proportional to the number of distinct cached predicates, not data size.

use crate::models::TaskRecord;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Fingerprint → ordered result set cache with wholesale invalidation.
#[derive(Debug, Default)]
pub struct QueryResultCache {
    entries: DashMap<u64, Vec<TaskRecord>>,
    tracked_fingerprints: Mutex<Vec<u64>>,
}

impl QueryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: u64) -> Option<Vec<TaskRecord>> {
        let result = self
            .entries
            .get(&fingerprint)
            .map(|entry| entry.value().clone());
        match result {
            Some(records) => {
                debug!(fingerprint, results = records.len(), "Query cache hit");
                Some(records)
            }
            None => {
                debug!(fingerprint, "Query cache miss");
                None
            }
        }
    }

    pub fn set(&self, fingerprint: u64, records: Vec<TaskRecord>) {
        self.entries.insert(fingerprint, records);
        let mut tracked = self.tracked_fingerprints.lock();
        if !tracked.contains(&fingerprint) {
            tracked.push(fingerprint);
        }
    }

    /// Clear every cached predicate result and the tracked fingerprint list.
    pub fn invalidate_all(&self) {
        let mut tracked = self.tracked_fingerprints.lock();
        let cleared = tracked.len();
        for fingerprint in tracked.drain(..) {
            self.entries.remove(&fingerprint);
        }

        if cleared > 0 {
            info!(cleared, "Invalidated all cached query results");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

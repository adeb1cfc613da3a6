//! # Identity Cache
//!
//! Concurrent id → record cache with per-entry expiration. Entries for
//! active-state records carry no deadline (kept while active); entries for
//! terminal-state records are installed with a short TTL so completed-task
//! lookups eventually fall through to the store.
//!
//! Expired entries are evicted lazily on the next access; there is no
//! background sweeper.

use crate::models::TaskRecord;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    record: TaskRecord,
    /// None means the entry never expires on its own.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(record: TaskRecord, ttl: Option<Duration>) -> Self {
        Self {
            record,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Concurrent map from record id to cached record.
#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: DashMap<String, CacheEntry>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record only if no live entry exists for its id.
    /// Returns true if the record was inserted.
    pub fn try_add(&self, record: TaskRecord, ttl: Option<Duration>) -> bool {
        let id = record.id.clone();
        // An expired entry does not block insertion.
        self.entries.remove_if(&id, |_, entry| entry.is_expired());

        match self.entries.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(CacheEntry::new(record, ttl));
                true
            }
        }
    }

    /// Look up a record by id, lazily evicting it if its TTL has lapsed.
    pub fn try_get(&self, id: &str) -> Option<TaskRecord> {
        let expired = match self.entries.get(id) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => return Some(entry.record.clone()),
            None => return None,
        };

        if expired {
            self.entries.remove_if(id, |_, entry| entry.is_expired());
            debug!(record_id = %id, "Evicted expired identity cache entry");
        }
        None
    }

    /// Insert or replace the entry for a record, resetting its deadline.
    pub fn try_update(&self, record: TaskRecord, ttl: Option<Duration>) {
        let id = record.id.clone();
        self.entries.insert(id, CacheEntry::new(record, ttl));
    }

    /// Remove the entry for an id. Returns true if an entry was present.
    pub fn try_remove(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remaining time before the entry for `id` expires; `Some(None)` means
    /// the entry is present and never expires.
    #[cfg(test)]
    fn entry_deadline(&self, id: &str) -> Option<Option<Instant>> {
        self.entries.get(id).map(|entry| entry.expires_at)
    }
}

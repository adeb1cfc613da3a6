//! Shared test infrastructure: a scripted mock store with failure injection
//! and per-operation call counters, plus record builders.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use task_store::{QueryPredicate, RepositoryError, Result, TaskRecord, TaskState, TaskStore};

/// Build a record with a fixed id, state, and a creation time offset into the
/// past so ordering assertions are deterministic.
pub fn make_record(id: &str, state: TaskState, age_seconds: i64) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        state,
        created_at: Utc::now() - ChronoDuration::seconds(age_seconds),
        payload: json!({"command": format!("run {id}")}),
    }
}

/// In-memory store that can be scripted to fail the next N operations and
/// counts calls per operation. Does not support paging (inherits the trait
/// default).
#[derive(Debug, Default)]
pub struct MockTaskStore {
    records: RwLock<HashMap<String, TaskRecord>>,
    failures_remaining: AtomicU32,
    pub create_calls: AtomicU32,
    pub get_calls: AtomicU32,
    pub query_calls: AtomicU32,
    pub update_calls: AtomicU32,
    pub delete_calls: AtomicU32,
}

impl MockTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = TaskRecord>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.write();
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        store
    }

    /// Make the next `n` store operations fail with a transient storage error.
    pub fn fail_next(&self, n: u32) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    fn maybe_fail(&self) -> Result<()> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::storage("injected transient failure"));
        }
        Ok(())
    }

    pub fn total_get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn total_query_calls(&self) -> u32 {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn create(&self, record: TaskRecord) -> Result<TaskRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;

        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(RepositoryError::Validation(format!(
                "Task record with id {} already exists",
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;
        Ok(self.records.read().get(id).cloned())
    }

    async fn query(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;

        let mut matched: Vec<TaskRecord> = self
            .records
            .read()
            .values()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn update(&self, record: TaskRecord) -> Result<TaskRecord> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;

        let mut records = self.records.write();
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(RepositoryError::not_found(&record.id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;

        match self.records.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found(id)),
        }
    }
}

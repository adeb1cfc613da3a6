//! # In-Memory Store Adapter
//!
//! HashMap-backed [`TaskStore`] for tests and embedded use. Does not support
//! paging: the paginated entry point inherits the trait default, returning a
//! `None` continuation token with the full result set.

use crate::error::{RepositoryError, Result};
use crate::models::{QueryPredicate, TaskRecord};
use crate::store::TaskStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Volatile, process-local task store.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<String, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, record: TaskRecord) -> Result<TaskRecord> {
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
        Ok(self.records.read().get(id).cloned())
    }

    async fn query(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>> {
        let mut matched: Vec<TaskRecord> = self
            .records
            .read()
            .values()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect();

        // Deterministic order for callers and the query cache.
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn update(&self, record: TaskRecord) -> Result<TaskRecord> {
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
        match self.records.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTaskRecord, TaskState};
    use serde_json::json;

    fn record(state: TaskState) -> TaskRecord {
        NewTaskRecord::new(json!({"cpu_cores": 2}))
            .into_record()
            .with_state(state)
    }

    #[tokio::test]
    async fn test_create_get_update_delete_cycle() {
        let store = InMemoryTaskStore::new();
        let created = store.create(record(TaskState::Queued)).await.unwrap();

        let fetched = store.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = store
            .update(fetched.with_state(TaskState::Running))
            .await
            .unwrap();
        assert_eq!(updated.state, TaskState::Running);

        store.delete(&created.id).await.unwrap();
        assert!(store.get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemoryTaskStore::new();
        let created = store.create(record(TaskState::Queued)).await.unwrap();

        let result = store.create(created).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_yield_not_found() {
        let store = InMemoryTaskStore::new();

        let missing = record(TaskState::Running);
        assert!(matches!(
            store.update(missing).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("ghost").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_query_filters_and_orders_by_creation_time() {
        let store = InMemoryTaskStore::new();
        let first = store.create(record(TaskState::Running)).await.unwrap();
        let done = store.create(record(TaskState::Complete)).await.unwrap();
        let second = store.create(record(TaskState::Queued)).await.unwrap();

        let active = store.query(&QueryPredicate::active()).await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|r| r.id != done.id));
        assert!(active
            .windows(2)
            .all(|pair| pair[0].created_at <= pair[1].created_at));

        let all = store.query(&QueryPredicate::All).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|r| r.id == first.id));
        assert!(all.iter().any(|r| r.id == second.id));
    }

    #[tokio::test]
    async fn test_create_batch_inserts_every_record() {
        let store = InMemoryTaskStore::new();
        let batch = vec![record(TaskState::Queued), record(TaskState::Queued)];

        let created = store.create_batch(batch).await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_non_paging_adapter_returns_full_set_and_no_token() {
        let store = InMemoryTaskStore::new();
        for _ in 0..5 {
            store.create(record(TaskState::Queued)).await.unwrap();
        }

        let (token, records) = store
            .query_page(&QueryPredicate::All, 2, None)
            .await
            .unwrap();
        assert!(token.is_none());
        assert_eq!(records.len(), 5);
    }
}

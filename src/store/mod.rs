//! # Persistent Store Adapters
//!
//! The CRUD + predicate query contract the repository layer consumes, plus
//! the adapters that implement it:
//!
//! - [`postgres`] - durable sqlx/PostgreSQL adapter storing payloads as JSONB
//! - [`memory`] - in-process adapter for tests and embedded use
//!
//! Adapters own no cache state. All operations may fail with a generic
//! transient-or-fatal [`crate::error::RepositoryError::Storage`] error that
//! the retry executor treats uniformly.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::error::Result;
use crate::models::{QueryPredicate, TaskRecord};
use async_trait::async_trait;

pub use memory::InMemoryTaskStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresTaskStore;

/// Durable CRUD and predicate query over task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new record. Fails if the identifier already exists.
    async fn create(&self, record: TaskRecord) -> Result<TaskRecord>;

    /// Insert a batch of new records.
    async fn create_batch(&self, records: Vec<TaskRecord>) -> Result<Vec<TaskRecord>> {
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            created.push(self.create(record).await?);
        }
        Ok(created)
    }

    /// Fetch a record by id. `Ok(None)` means genuine absence.
    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>>;

    /// Fetch all records matching the predicate.
    async fn query(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>>;

    /// Fetch one page of records matching the predicate.
    ///
    /// Paging is an optional capability: the default implementation returns a
    /// `None` continuation token alongside the complete result set, and
    /// callers must treat a `None` token as end-of-results.
    async fn query_page(
        &self,
        predicate: &QueryPredicate,
        _page_size: u32,
        _continuation_token: Option<&str>,
    ) -> Result<(Option<String>, Vec<TaskRecord>)> {
        let records = self.query(predicate).await?;
        Ok((None, records))
    }

    /// Replace the stored record with the given id. Fails with
    /// [`crate::error::RepositoryError::NotFound`] if the id is absent.
    async fn update(&self, record: TaskRecord) -> Result<TaskRecord>;

    /// Delete the record with the given id. Fails with
    /// [`crate::error::RepositoryError::NotFound`] if the id is absent.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Release any resources held by the adapter.
    async fn close(&self) {}
}

/// Adapters are often shared between the repository and other owners (health
/// checks, tests); forwarding through `Arc` keeps that explicit.
#[async_trait]
impl<T: TaskStore + ?Sized> TaskStore for std::sync::Arc<T> {
    async fn create(&self, record: TaskRecord) -> Result<TaskRecord> {
        (**self).create(record).await
    }

    async fn create_batch(&self, records: Vec<TaskRecord>) -> Result<Vec<TaskRecord>> {
        (**self).create_batch(records).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        (**self).get_by_id(id).await
    }

    async fn query(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>> {
        (**self).query(predicate).await
    }

    async fn query_page(
        &self,
        predicate: &QueryPredicate,
        page_size: u32,
        continuation_token: Option<&str>,
    ) -> Result<(Option<String>, Vec<TaskRecord>)> {
        (**self).query_page(predicate, page_size, continuation_token).await
    }

    async fn update(&self, record: TaskRecord) -> Result<TaskRecord> {
        (**self).update(record).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id).await
    }

    async fn close(&self) {
        (**self).close().await;
    }
}

//! # Cache-and-Retry Repository
//!
//! Composes the identity cache, the predicate-query cache, and the retry
//! executor around a [`TaskStore`], implementing the full repository
//! contract consumed by the transport layer.
//!
//! ## Control Flow
//!
//! Reads consult the identity cache first, fall back to the store through
//! the retry executor on miss, and populate the cache on success. Mutations
//! apply through the retry executor, then refresh or remove the affected
//! identity entry and invalidate the entire predicate-query cache. Cache
//! writes happen only after the store operation has fully succeeded, so a
//! cancelled (dropped) operation never leaves a half-updated entry.
//!
//! ## Readiness Gate
//!
//! [`CachingRepository::initialize`] warms the identity cache with every
//! active-state record before returning; a process must not serve requests
//! against an unwarmed, enabled cache. With caching disabled the repository
//! degrades to a retrying pass-through and warming is skipped.

pub mod warmer;

use crate::cache::{IdentityCache, QueryResultCache};
use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, Result};
use crate::models::{QueryPredicate, TaskRecord};
use crate::resilience::RetryExecutor;
use crate::store::TaskStore;
use tracing::{debug, info};

/// Caches owned exclusively by one repository instance.
#[derive(Debug, Default)]
struct RepositoryCaches {
    identity: IdentityCache,
    query: QueryResultCache,
}

/// Caching, retrying repository over a persistent task store.
pub struct CachingRepository<S: TaskStore> {
    store: S,
    config: RepositoryConfig,
    caches: Option<RepositoryCaches>,
    store_retry: RetryExecutor,
}

impl<S: TaskStore> CachingRepository<S> {
    /// Construct the repository and run the startup warming gate.
    ///
    /// Warming failure after the retry budget is a startup-abort condition:
    /// the error propagates and no repository instance is returned.
    pub async fn initialize(store: S, config: RepositoryConfig) -> Result<Self> {
        config.validate().map_err(RepositoryError::Configuration)?;
        config.log_configuration();

        let caches = if config.cache.enabled {
            Some(RepositoryCaches::default())
        } else {
            info!("Caching disabled; repository operates as a retrying pass-through");
            None
        };

        let repository = Self {
            store_retry: RetryExecutor::new("task-store", config.store_retry.policy()),
            store,
            config,
            caches,
        };

        if let Some(caches) = &repository.caches {
            warmer::warm_identity_cache(
                &repository.store,
                &caches.identity,
                &repository.config.cache,
                repository.config.warming_retry.policy(),
            )
            .await?;
        }

        Ok(repository)
    }

    /// Create a new record. The identity cache is not pre-populated; the next
    /// read fills it. All cached query results are invalidated, since the new
    /// record may satisfy previously-cached predicates.
    pub async fn create_item(&self, record: TaskRecord) -> Result<TaskRecord> {
        let created = self
            .store_retry
            .execute("create_item", || self.store.create(record.clone()))
            .await?;

        self.invalidate_queries();
        Ok(created)
    }

    /// Create a batch of records, invalidating cached query results once.
    pub async fn create_items(&self, records: Vec<TaskRecord>) -> Result<Vec<TaskRecord>> {
        let created = self
            .store_retry
            .execute("create_items", || self.store.create_batch(records.clone()))
            .await?;

        self.invalidate_queries();
        Ok(created)
    }

    /// Look up a record by id. Returns `Ok(None)` only for genuine absence;
    /// transient store failures propagate as errors after retry exhaustion.
    pub async fn try_get_item(&self, id: &str) -> Result<Option<TaskRecord>> {
        if let Some(caches) = &self.caches {
            if let Some(record) = caches.identity.try_get(id) {
                debug!(record_id = %id, "Identity cache hit");
                return Ok(Some(record));
            }
        }

        let fetched = self
            .store_retry
            .execute("get_by_id", || self.store.get_by_id(id))
            .await?;

        if let (Some(caches), Some(record)) = (&self.caches, &fetched) {
            caches
                .identity
                .try_add(record.clone(), self.config.cache.entry_ttl(record.state));
        }

        Ok(fetched)
    }

    /// Fetch all records matching the predicate, reusing a cached result set
    /// when one exists for the same predicate fingerprint.
    pub async fn get_items(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>> {
        let fingerprint = predicate.fingerprint();

        if let Some(caches) = &self.caches {
            if let Some(records) = caches.query.get(fingerprint) {
                return Ok(records);
            }
        }

        let records = self
            .store_retry
            .execute("query", || self.store.query(predicate))
            .await?;

        if let Some(caches) = &self.caches {
            caches.query.set(fingerprint, records.clone());
        }

        Ok(records)
    }

    /// Fetch one page of records matching the predicate. Paged results are
    /// never cached. A `None` continuation token means end-of-results; an
    /// adapter without paging support returns the full set with a `None`
    /// token.
    pub async fn get_items_page(
        &self,
        predicate: &QueryPredicate,
        page_size: u32,
        continuation_token: Option<&str>,
    ) -> Result<(Option<String>, Vec<TaskRecord>)> {
        self.store_retry
            .execute("query_page", || {
                self.store
                    .query_page(predicate, page_size, continuation_token)
            })
            .await
    }

    /// Replace a record by full replacement of state and payload. NotFound
    /// surfaces immediately without retries. On success the identity entry is
    /// refreshed with a TTL chosen by the post-update state and all cached
    /// query results are invalidated.
    pub async fn update_item(&self, record: TaskRecord) -> Result<TaskRecord> {
        let updated = self
            .store_retry
            .execute("update_item", || self.store.update(record.clone()))
            .await?;

        if let Some(caches) = &self.caches {
            caches
                .identity
                .try_update(updated.clone(), self.config.cache.entry_ttl(updated.state));
        }
        self.invalidate_queries();

        Ok(updated)
    }

    /// Delete a record. The identity entry is removed unconditionally before
    /// the store delete; NotFound surfaces immediately without retries.
    pub async fn delete_item(&self, id: &str) -> Result<()> {
        if let Some(caches) = &self.caches {
            caches.identity.try_remove(id);
        }

        self.store_retry
            .execute("delete_item", || self.store.delete(id))
            .await?;

        self.invalidate_queries();
        Ok(())
    }

    /// Release cache resources and close the wrapped store.
    pub async fn shutdown(self) {
        if let Some(caches) = &self.caches {
            caches.identity.clear();
            caches.query.invalidate_all();
        }
        self.store.close().await;
        info!("Repository shut down");
    }

    pub fn cache_enabled(&self) -> bool {
        self.caches.is_some()
    }

    fn invalidate_queries(&self) {
        if let Some(caches) = &self.caches {
            caches.query.invalidate_all();
        }
    }
}

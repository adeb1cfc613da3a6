#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Task Store
//!
//! Durable persistence and caching layer for long-lived task records in a
//! task-execution service. Records move through a lifecycle of states and
//! stay retrievable by identifier or by predicate query with low latency,
//! despite an unreliable or slow backing store.
//!
//! ## Architecture
//!
//! The core is a **cache-and-retry repository** layered over a pluggable
//! persistent store:
//!
//! - An identity cache (id → record) with state-dependent expiration: active
//!   records are kept while active, terminal records expire after a short TTL.
//! - A predicate-query cache keyed by predicate fingerprint, invalidated
//!   wholesale on every successful mutation.
//! - A bounded-retry executor with fixed backoff wrapping every store call.
//! - A startup cache warmer that preloads all active-state records before the
//!   repository accepts traffic.
//!
//! This is a per-process, best-effort read-through cache atop a source of
//! truth; it does not provide strong consistency across nodes.
//!
//! ## Module Organization
//!
//! - [`models`] - Task records, lifecycle states, and query predicates
//! - [`store`] - The persistent store contract and its adapters
//! - [`cache`] - Identity and query result caches
//! - [`resilience`] - Bounded-retry execution
//! - [`repository`] - The composed cache-and-retry repository
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use task_store::{CachingRepository, InMemoryTaskStore, NewTaskRecord, RepositoryConfig};
//!
//! # async fn example() -> task_store::Result<()> {
//! let store = InMemoryTaskStore::new();
//! let repository = CachingRepository::initialize(store, RepositoryConfig::new()).await?;
//!
//! let record = NewTaskRecord::new(serde_json::json!({"command": "echo"})).into_record();
//! let created = repository.create_item(record).await?;
//! let fetched = repository.try_get_item(&created.id).await?;
//! assert!(fetched.is_some());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod resilience;
pub mod store;

pub use cache::{IdentityCache, QueryResultCache};
pub use config::{CacheConfig, RepositoryConfig, RetryConfig};
pub use error::{RepositoryError, Result};
pub use models::{NewTaskRecord, QueryPredicate, TaskRecord, TaskState};
pub use repository::CachingRepository;
pub use resilience::{RetryExecutor, RetryPolicy, RetryableError};
#[cfg(feature = "postgres")]
pub use store::PostgresTaskStore;
pub use store::{InMemoryTaskStore, TaskStore};

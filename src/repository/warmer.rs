//! # Cache Warmer
//!
//! Startup routine that preloads every active-state record into the identity
//! cache, ordered by creation time ascending, before the repository is
//! handed to callers. The whole query-and-insert pass is wrapped by the
//! retry executor; exhaustion is an unrecoverable startup failure, because
//! serving traffic against an unwarmed, enabled cache would let staleness
//! propagate rather than bound it.

use crate::cache::IdentityCache;
use crate::config::CacheConfig;
use crate::error::{RepositoryError, Result};
use crate::models::QueryPredicate;
use crate::resilience::{RetryExecutor, RetryPolicy};
use crate::store::TaskStore;
use std::time::Instant;
use tracing::{error, info};

/// Preload all active-state records into the identity cache, retried with
/// the given policy. Runs once per process lifetime.
pub(crate) async fn warm_identity_cache<S: TaskStore>(
    store: &S,
    cache: &IdentityCache,
    cache_config: &CacheConfig,
    policy: RetryPolicy,
) -> Result<()> {
    let executor = RetryExecutor::new("cache-warmer", policy);
    let started = Instant::now();
    info!("Warming identity cache...");

    let added = executor
        .execute("warm_active_records", move || async move {
            let mut active = store.query(&QueryPredicate::active()).await?;
            active.sort_by(|a, b| a.created_at.cmp(&b.created_at));

            let mut added = 0usize;
            for record in active {
                let ttl = cache_config.entry_ttl(record.state);
                if cache.try_add(record, ttl) {
                    added += 1;
                }
            }
            Ok::<_, RepositoryError>(added)
        })
        .await
        .map_err(|err| {
            error!(error = %err, "Could not warm identity cache, is the store online?");
            err
        })?;

    info!(
        added,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Identity cache warmed"
    );
    Ok(())
}

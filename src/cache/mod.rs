//! # Cache Layer
//!
//! Per-process, best-effort caches owned by the repository:
//!
//! - [`identity`] - id → record cache with per-entry, state-dependent expiration
//! - [`query`] - predicate-fingerprint → result set cache, invalidated
//!   wholesale on any mutation
//!
//! Neither cache sweeps proactively; staleness is bounded by entry TTL and by
//! wholesale invalidation, not wall-clock sweeping.

pub mod identity;
pub mod query;

pub use identity::IdentityCache;
pub use query::QueryResultCache;

//! # Structured Error Handling
//!
//! Error types for the caching repository layer. Transient store failures are
//! retryable; NotFound, validation, and configuration problems surface to the
//! caller immediately.

use crate::resilience::RetryableError;

/// Errors surfaced by the repository layer and its store adapters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// Transient-or-fatal store failure. The retry executor treats these
    /// uniformly up to its attempt budget.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Update or Delete targeted an identifier absent from the store.
    #[error("No task record found with id {0}")]
    NotFound(String),

    /// Caller-supplied input was rejected before reaching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid repository or cache configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}

impl RetryableError for RepositoryError {
    /// Only storage failures are worth another attempt; everything else is a
    /// definitive answer from the store or the caller's own mistake.
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

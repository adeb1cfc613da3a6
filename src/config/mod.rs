//! # Repository Configuration
//!
//! Configuration for the caching repository: cache enablement, the
//! state-dependent expiration policy, and the retry budgets for ordinary
//! store operations and for startup cache warming. Supports environment
//! detection (test/development/production) with `TASK_STORE_*` environment
//! variable overrides.

use crate::constants::system;
use crate::models::TaskState;
use crate::resilience::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Top-level configuration for a [`crate::repository::CachingRepository`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub cache: CacheConfig,
    pub store_retry: RetryConfig,
    pub warming_retry: RetryConfig,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity and query cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false, both caches become no-op pass-throughs and warming is skipped.
    pub enabled: bool,
    /// TTL applied to identity cache entries for terminal-state records.
    pub terminal_entry_ttl_seconds: u64,
}

impl CacheConfig {
    /// Expiration policy by lifecycle state: active records are kept while
    /// active (no expiry); terminal records expire after a short TTL so the
    /// cache does not grow unbounded with historical records.
    pub fn entry_ttl(&self, state: TaskState) -> Option<Duration> {
        if state.is_terminal() {
            Some(Duration::from_secs(self.terminal_entry_ttl_seconds))
        } else {
            None
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            terminal_entry_ttl_seconds: system::TERMINAL_ENTRY_TTL_SECONDS,
        }
    }
}

/// Attempt budget and fixed backoff for a retry path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_millis: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_millis))
    }

    fn for_warming() -> Self {
        Self {
            max_attempts: system::DEFAULT_RETRY_ATTEMPTS,
            backoff_millis: system::WARMING_BACKOFF_MILLIS,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: system::DEFAULT_RETRY_ATTEMPTS,
            backoff_millis: system::STORE_BACKOFF_MILLIS,
        }
    }
}

impl RepositoryConfig {
    /// Production defaults: caching on, day-long terminal TTL, 3 attempts
    /// with a 10 second backoff on the warming path.
    pub fn new() -> Self {
        Self {
            cache: CacheConfig::default(),
            store_retry: RetryConfig::default(),
            warming_retry: RetryConfig::for_warming(),
        }
    }

    /// Test-optimized configuration with rapid expiry and millisecond backoffs.
    pub fn for_test() -> Self {
        Self {
            cache: CacheConfig {
                enabled: true,
                terminal_entry_ttl_seconds: 1,
            },
            store_retry: RetryConfig {
                max_attempts: 3,
                backoff_millis: 10,
            },
            warming_retry: RetryConfig {
                max_attempts: 3,
                backoff_millis: 10,
            },
        }
    }

    /// Load configuration from the detected environment, then apply
    /// `TASK_STORE_*` environment variable overrides.
    pub fn from_environment() -> Self {
        let environment = env::var("TASK_STORE_ENV")
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| "production".to_string());

        let config = match environment.as_str() {
            "test" => {
                info!("Loading test repository configuration (rapid expiry)");
                Self::for_test()
            }
            _ => {
                info!("Loading production repository configuration");
                Self::new()
            }
        };

        config.with_env_overrides()
    }

    /// Apply environment variable overrides to configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(enabled) = env::var("TASK_STORE_CACHE_ENABLED") {
            self.cache.enabled = enabled.parse().unwrap_or(self.cache.enabled);
            info!("Cache enabled override: {}", self.cache.enabled);
        }

        if let Ok(ttl) = env::var("TASK_STORE_TERMINAL_TTL_SECONDS") {
            if let Ok(seconds) = ttl.parse::<u64>() {
                self.cache.terminal_entry_ttl_seconds = seconds;
                info!("Terminal entry TTL override: {}s", seconds);
            }
        }

        if let Ok(attempts) = env::var("TASK_STORE_RETRY_MAX_ATTEMPTS") {
            if let Ok(attempts) = attempts.parse::<u32>() {
                self.store_retry.max_attempts = attempts;
                self.warming_retry.max_attempts = attempts;
                info!("Retry max attempts override: {}", attempts);
            }
        }

        if let Ok(backoff) = env::var("TASK_STORE_WARMING_BACKOFF_MILLIS") {
            if let Ok(millis) = backoff.parse::<u64>() {
                self.warming_retry.backoff_millis = millis;
                info!("Warming backoff override: {}ms", millis);
            }
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_retry.max_attempts == 0 {
            return Err("Store retry max attempts must be greater than 0".to_string());
        }

        if self.warming_retry.max_attempts == 0 {
            return Err("Warming retry max attempts must be greater than 0".to_string());
        }

        if self.cache.enabled && self.cache.terminal_entry_ttl_seconds == 0 {
            warn!("Terminal entry TTL is 0 - terminal records will not be cached");
        }

        Ok(())
    }

    /// Log current configuration for debugging.
    pub fn log_configuration(&self) {
        info!("Repository configuration:");
        info!("  Cache enabled: {}", self.cache.enabled);
        info!(
            "  Terminal entry TTL: {}s",
            self.cache.terminal_entry_ttl_seconds
        );
        info!(
            "  Store retry: {} attempts, {}ms backoff",
            self.store_retry.max_attempts, self.store_retry.backoff_millis
        );
        info!(
            "  Warming retry: {} attempts, {}ms backoff",
            self.warming_retry.max_attempts, self.warming_retry.backoff_millis
        );
    }
}

//! # System Constants and Status Groupings
//!
//! Core constants that define the operational boundaries of the repository
//! layer: the active/terminal partition of task states and the default retry
//! and expiration knobs the configuration layer starts from.

pub use crate::models::TaskState;

/// Status groupings for cache policy and warming decisions
pub mod status_groups {
    use super::TaskState;

    /// Task states in which the record may still change
    pub const ACTIVE_STATES: &[TaskState] = &[
        TaskState::Queued,
        TaskState::Initializing,
        TaskState::Running,
        TaskState::Paused,
    ];

    /// Task states from which no further transition occurs
    pub const TERMINAL_STATES: &[TaskState] = &[
        TaskState::Complete,
        TaskState::ExecutorError,
        TaskState::SystemError,
        TaskState::Canceled,
    ];
}

/// System-wide defaults
pub mod system {
    /// Total attempts the retry executor makes before giving up
    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

    /// Fixed backoff between cache-warming attempts
    pub const WARMING_BACKOFF_MILLIS: u64 = 10_000;

    /// Fixed backoff between retries of ordinary store operations
    pub const STORE_BACKOFF_MILLIS: u64 = 1_000;

    /// How long entries for terminal-state records stay cached
    pub const TERMINAL_ENTRY_TTL_SECONDS: u64 = 86_400;
}

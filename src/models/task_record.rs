//! # Task Record Model
//!
//! The persisted unit of work managed by the repository layer. A record
//! carries only the fields the caching layer needs to make decisions
//! (identifier, lifecycle state, creation time); every other domain field
//! lives in the opaque JSON payload.
//!
//! ## Lifecycle
//!
//! A record is created once, updated any number of times by full replacement,
//! and deleted at most once. States are partitioned into an *active* subset
//! (the task may still change) and a *terminal* subset (no further
//! transitions), which drives the cache expiration policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle states a task record moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Accepted and waiting for resources
    Queued,
    /// Resources are being prepared
    Initializing,
    /// Task is executing
    Running,
    /// Execution is suspended and may resume
    Paused,
    /// Task finished successfully
    Complete,
    /// Task failed inside the executor
    ExecutorError,
    /// Task failed due to a system fault
    SystemError,
    /// Task was canceled by the caller
    Canceled,
}

impl TaskState {
    /// Check if this is a terminal state (no further transitions occur)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::ExecutorError | Self::SystemError | Self::Canceled
        )
    }

    /// Check if the task may still change state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Complete => write!(f, "complete"),
            Self::ExecutorError => write!(f, "executor_error"),
            Self::SystemError => write!(f, "system_error"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "initializing" => Ok(Self::Initializing),
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "complete" => Ok(Self::Complete),
            "executor_error" => Ok(Self::ExecutorError),
            "system_error" => Ok(Self::SystemError),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("Unknown task state: {s}")),
        }
    }
}

/// A persisted task record.
///
/// Exactly one record exists per identifier in the store at any time; the
/// identifier is immutable once created. Updates replace the state and
/// payload wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl TaskRecord {
    /// Return a copy of this record transitioned to a new state.
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }
}

/// New task record for creation (identifier and creation time are generated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskRecord {
    pub state: Option<TaskState>,
    pub payload: serde_json::Value,
}

impl NewTaskRecord {
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            state: None,
            payload,
        }
    }

    /// Materialize a record with a fresh UUID and the current time.
    pub fn into_record(self) -> TaskRecord {
        TaskRecord {
            id: Uuid::new_v4().to_string(),
            state: self.state.unwrap_or(TaskState::Queued),
            created_at: Utc::now(),
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_partition_is_total() {
        let all = [
            TaskState::Queued,
            TaskState::Initializing,
            TaskState::Running,
            TaskState::Paused,
            TaskState::Complete,
            TaskState::ExecutorError,
            TaskState::SystemError,
            TaskState::Canceled,
        ];

        for state in all {
            assert_ne!(state.is_active(), state.is_terminal());
        }
    }

    #[test]
    fn test_state_round_trips_through_str() {
        let states = [
            TaskState::Running,
            TaskState::ExecutorError,
            TaskState::Canceled,
        ];

        for state in states {
            let parsed: TaskState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }

        assert!("definitely_not_a_state".parse::<TaskState>().is_err());
    }

    #[test]
    fn test_new_record_defaults_to_queued() {
        let record = NewTaskRecord::new(json!({"command": "echo hello"})).into_record();
        assert_eq!(record.state, TaskState::Queued);
        assert!(!record.id.is_empty());
    }
}

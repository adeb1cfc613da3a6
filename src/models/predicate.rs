//! # Query Predicates
//!
//! Structural filter expressions over task records. Predicates serve two
//! roles: store adapters evaluate them against records (optionally narrowing
//! the scan with [`QueryPredicate::state_filter`]), and the query result
//! cache keys entries by their [`QueryPredicate::fingerprint`].
//!
//! Fingerprints are derived from the predicate's structure, so two
//! semantically identical predicates always map to the same cache key. No
//! normalization beyond structural equality is attempted: `And([A, B])` and
//! `And([B, A])` are distinct keys.

use crate::constants::status_groups;
use crate::models::{TaskRecord, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A filter expression over task records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPredicate {
    /// Matches every record
    All,
    /// Matches records whose state is one of the given states
    StateIn(Vec<TaskState>),
    /// Matches records created strictly after the given instant
    CreatedAfter(DateTime<Utc>),
    /// Matches records created strictly before the given instant
    CreatedBefore(DateTime<Utc>),
    /// Matches records satisfying every sub-predicate
    And(Vec<QueryPredicate>),
}

impl QueryPredicate {
    /// Predicate selecting all records in an active (non-terminal) state.
    pub fn active() -> Self {
        Self::StateIn(status_groups::ACTIVE_STATES.to_vec())
    }

    /// Evaluate this predicate against a record.
    pub fn matches(&self, record: &TaskRecord) -> bool {
        match self {
            Self::All => true,
            Self::StateIn(states) => states.contains(&record.state),
            Self::CreatedAfter(instant) => record.created_at > *instant,
            Self::CreatedBefore(instant) => record.created_at < *instant,
            Self::And(predicates) => predicates.iter().all(|p| p.matches(record)),
        }
    }

    /// Stable digest of the predicate's structure, used as the query cache key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// States this predicate restricts to, if it restricts by state at all.
    /// Store adapters use this to narrow the scan before full evaluation.
    pub fn state_filter(&self) -> Option<Vec<TaskState>> {
        match self {
            Self::StateIn(states) => Some(states.clone()),
            Self::And(predicates) => predicates.iter().find_map(|p| p.state_filter()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTaskRecord;
    use chrono::Duration;
    use serde_json::json;

    fn record_in(state: TaskState) -> TaskRecord {
        NewTaskRecord::new(json!({})).into_record().with_state(state)
    }

    #[test]
    fn test_active_predicate_matches_only_active_states() {
        let predicate = QueryPredicate::active();
        assert!(predicate.matches(&record_in(TaskState::Running)));
        assert!(predicate.matches(&record_in(TaskState::Paused)));
        assert!(!predicate.matches(&record_in(TaskState::Complete)));
        assert!(!predicate.matches(&record_in(TaskState::Canceled)));
    }

    #[test]
    fn test_and_requires_every_clause() {
        let record = record_in(TaskState::Running);
        let earlier = record.created_at - Duration::seconds(60);

        let matching = QueryPredicate::And(vec![
            QueryPredicate::StateIn(vec![TaskState::Running]),
            QueryPredicate::CreatedAfter(earlier),
        ]);
        assert!(matching.matches(&record));

        let failing = QueryPredicate::And(vec![
            QueryPredicate::StateIn(vec![TaskState::Running]),
            QueryPredicate::CreatedBefore(earlier),
        ]);
        assert!(!failing.matches(&record));
    }

    #[test]
    fn test_fingerprint_stable_for_identical_predicates() {
        let a = QueryPredicate::StateIn(vec![TaskState::Queued, TaskState::Running]);
        let b = QueryPredicate::StateIn(vec![TaskState::Queued, TaskState::Running]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_diverges_for_different_predicates() {
        let a = QueryPredicate::StateIn(vec![TaskState::Queued]);
        let b = QueryPredicate::StateIn(vec![TaskState::Running]);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), QueryPredicate::All.fingerprint());
    }

    #[test]
    fn test_state_filter_surfaces_through_and() {
        let predicate = QueryPredicate::And(vec![
            QueryPredicate::CreatedAfter(Utc::now()),
            QueryPredicate::StateIn(vec![TaskState::Running]),
        ]);
        assert_eq!(predicate.state_filter(), Some(vec![TaskState::Running]));
        assert_eq!(QueryPredicate::All.state_filter(), None);
    }
}

//! Data model for the task repository layer.
//!
//! - [`task_record`] - Task records and the lifecycle state enum
//! - [`predicate`] - Structural query predicates with stable fingerprints

pub mod predicate;
pub mod task_record;

pub use predicate::QueryPredicate;
pub use task_record::{NewTaskRecord, TaskRecord, TaskState};

//! # Resilience Module
//!
//! Bounded-retry execution for store operations. Every repository call that
//! touches the backing store goes through a [`RetryExecutor`], which absorbs
//! transient failures up to its attempt budget and surfaces the final error
//! unmodified once the budget is exhausted.
//!
//! The executor makes no distinction between transient and permanent storage
//! failures; only errors that classify themselves as non-retryable through
//! [`RetryableError`] (NotFound, validation, configuration) short-circuit.

pub mod retry;

pub use retry::{RetryExecutor, RetryPolicy, RetryableError};

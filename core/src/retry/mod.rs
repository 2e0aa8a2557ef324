//! Retry harness for fallible operations.
//!
//! An operation is a zero-argument closure reporting success as `true`.
//! `RetryPolicy::execute` runs it at a fixed interval until it succeeds or
//! the attempt budget is spent. Panics inside the operation, and `Err`
//! results from operations that return `Result<bool, E>`, count as failed
//! attempts whose payload is kept for the caller. Attempts never overlap;
//! the calling thread blocks for the whole sequence, sleeps included.

mod failure;
mod policy;
mod run;

pub use failure::{Attempt, AttemptOutcome, FailureDetail};
pub use policy::{CancelToken, MaxAttempts, RetryPolicy};
pub use run::{RetryOutcome, RetryState};

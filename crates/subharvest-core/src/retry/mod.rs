//! Retry and backoff policy for playlist-level fetches.
//!
//! Failures are classified once, at the fetch-tool boundary, into a
//! [`FailureKind`]; this module decides what each kind means for the retry
//! loop (back off and retry, or give up) and owns the blocking sleeps.

mod policy;
mod run;
mod sleep;

pub use policy::{jitter, Classified, FailureKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryError};
pub use sleep::{Pacer, RecordingSleeper, Sleeper, ThreadSleeper};

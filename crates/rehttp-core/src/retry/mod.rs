//! Retry policy and the blocking retry loop.
//!
//! This module holds the pure retry decision (status codes and transport
//! failures), the per-call cancellation controls, and the loop that both
//! requesters drive so they share one behavior.

mod classify;
mod control;
mod error;
mod policy;
mod run;

pub use classify::Outcome;
pub use control::{CallControl, CancelReason, CancelToken};
pub use error::{ConfigError, RequestError};
pub use policy::{
    should_retry, RetryDecision, RetryPolicy, DEFAULT_RETRY_CODES, DEFAULT_RETRY_DELAY,
    DEFAULT_RETRY_LIMIT, DEFAULT_RETRY_TRANSPORT,
};
pub use run::run_with_retry;

pub(crate) use policy::duration_from_secs;

use std::collections::BTreeSet;
use std::time::Duration;

use super::classify::Outcome;
use super::error::ConfigError;
use crate::transport::{TransportError, TransportErrorKind};

/// Pause between attempts when nothing else is configured.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Additional attempts after the first when nothing else is configured.
pub const DEFAULT_RETRY_LIMIT: u32 = 10;

/// Status codes retried by default: 429 Too Many Requests and 500..=511.
///
/// Override per requester with [`RetryPolicy::with_codes`].
pub const DEFAULT_RETRY_CODES: &[u16] = &[
    429, 500, 501, 502, 503, 504, 505, 506, 507, 508, 509, 510, 511,
];

/// Transport failures retried by default: all of them.
pub const DEFAULT_RETRY_TRANSPORT: &[TransportErrorKind] = &TransportErrorKind::ALL;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the outcome back to the caller.
    NoRetry,
    /// Sleep for the given delay, then issue the request again.
    RetryAfter(Duration),
}

/// Fixed-delay, fixed-limit retry policy.
///
/// Immutable once built; requesters keep it behind an `Arc` and share it
/// across every call without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    retry_delay: Duration,
    retry_limit: u32,
    retry_codes: BTreeSet<u16>,
    retry_transport: BTreeSet<TransportErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETRY_DELAY,
            DEFAULT_RETRY_LIMIT,
            DEFAULT_RETRY_CODES.iter().copied(),
        )
    }
}

impl RetryPolicy {
    pub fn new(
        retry_delay: Duration,
        retry_limit: u32,
        retry_codes: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            retry_delay,
            retry_limit,
            retry_codes: retry_codes.into_iter().collect(),
            retry_transport: DEFAULT_RETRY_TRANSPORT.iter().copied().collect(),
        }
    }

    /// Build a policy from loosely typed settings (config file, CLI flags).
    ///
    /// Negative or non-finite delays and negative limits are rejected here so
    /// they never reach the retry loop.
    pub fn from_secs(
        retry_delay_secs: f64,
        retry_limit: i64,
        retry_codes: impl IntoIterator<Item = u16>,
    ) -> Result<Self, ConfigError> {
        let retry_delay = duration_from_secs("retry_delay", retry_delay_secs)?;
        if retry_limit < 0 {
            return Err(ConfigError::NegativeLimit(retry_limit));
        }
        let retry_limit =
            u32::try_from(retry_limit).map_err(|_| ConfigError::LimitTooLarge(retry_limit))?;
        Ok(Self::new(retry_delay, retry_limit, retry_codes))
    }

    pub fn with_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Replace the retryable status codes.
    pub fn with_codes(mut self, retry_codes: impl IntoIterator<Item = u16>) -> Self {
        self.retry_codes = retry_codes.into_iter().collect();
        self
    }

    /// Replace the transport failure kinds that are retried. An empty set
    /// hands every transport failure straight back to the caller.
    pub fn with_transport_kinds(
        mut self,
        retry_transport: impl IntoIterator<Item = TransportErrorKind>,
    ) -> Self {
        self.retry_transport = retry_transport.into_iter().collect();
        self
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    pub fn retry_codes(&self) -> &BTreeSet<u16> {
        &self.retry_codes
    }

    pub fn retry_transport(&self) -> &BTreeSet<TransportErrorKind> {
        &self.retry_transport
    }

    /// Malformed requests and closed sessions are never retried.
    pub fn is_retryable_transport(&self, err: &TransportError) -> bool {
        err.kind()
            .is_some_and(|kind| self.retry_transport.contains(&kind))
    }

    /// Status codes are opaque integers; only set membership matters.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_codes.contains(&status)
    }

    /// Pure retry predicate.
    ///
    /// `attempts_made` counts the failed attempts already retried (0 after
    /// the first attempt). Retries while it is below the limit and the
    /// outcome is a transport failure of a retried kind or a status in the set.
    pub fn should_retry(&self, outcome: Outcome<'_>, attempts_made: u32) -> bool {
        if attempts_made >= self.retry_limit {
            return false;
        }
        match outcome {
            Outcome::Status(status) => self.is_retryable_status(status),
            Outcome::Transport(err) => self.is_retryable_transport(err),
        }
    }

    /// Same as [`should_retry`](Self::should_retry), paired with the delay.
    pub fn decide(&self, outcome: Outcome<'_>, attempts_made: u32) -> RetryDecision {
        if self.should_retry(outcome, attempts_made) {
            RetryDecision::RetryAfter(self.retry_delay)
        } else {
            RetryDecision::NoRetry
        }
    }
}

/// Free-function form of [`RetryPolicy::should_retry`].
pub fn should_retry(outcome: Outcome<'_>, attempts_made: u32, policy: &RetryPolicy) -> bool {
    policy.should_retry(outcome, attempts_made)
}

pub(crate) fn duration_from_secs(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ConfigError::InvalidDuration { field, value: secs })
}

//! Per-call cancellation: an optional deadline and a shared cancel token.
//!
//! Both are checked before every attempt and while sleeping between
//! attempts. A request already handed to the transport is not interrupted;
//! bound it with the request's own `timeout` option instead.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a sleeping retry loop looks at its cancel token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Why a call stopped before the retry loop finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancel token was triggered.
    Token,
    /// The call's deadline passed.
    Deadline,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Token => write!(f, "cancelled by caller"),
            CancelReason::Deadline => write!(f, "deadline exceeded"),
        }
    }
}

/// Cloneable cancel flag; any clone can stop the calls holding it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancellation settings for one verb call. The default never cancels.
#[derive(Debug, Clone, Default)]
pub struct CallControl {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl CallControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now. A timeout too large to represent as an
    /// `Instant` leaves the call without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn check(&self) -> Result<(), CancelReason> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(CancelReason::Token);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CancelReason::Deadline);
        }
        Ok(())
    }

    /// Blocking sleep for `delay`, cut short by the token or the deadline.
    pub(crate) fn pause(&self, delay: Duration) -> Result<(), CancelReason> {
        let start = Instant::now();
        loop {
            self.check()?;
            let elapsed = start.elapsed();
            if elapsed >= delay {
                return Ok(());
            }
            let mut step = delay - elapsed;
            if self.cancel.is_some() {
                step = step.min(CANCEL_POLL_INTERVAL);
            }
            if let Some(deadline) = self.deadline {
                step = step.min(deadline.saturating_duration_since(Instant::now()));
            }
            thread::sleep(step);
        }
    }
}

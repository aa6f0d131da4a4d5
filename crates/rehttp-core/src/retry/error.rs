//! Errors surfaced by requesters and by policy construction.

use super::control::CancelReason;
use crate::transport::TransportError;

/// Error returned by a verb call once the retry loop has finished.
///
/// HTTP status codes never show up here: any response, 404 and 503
/// included, is returned as `Ok`.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The final attempt failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The call's deadline passed or its cancel token fired.
    #[error("request cancelled ({reason}) after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts that reached the transport before stopping.
        attempts: u32,
        reason: CancelReason,
    },
}

impl RequestError {
    /// The propagated transport failure, if that is what ended the call.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            RequestError::Transport(err) => Some(err),
            RequestError::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled { .. })
    }
}

/// Invalid retry or request settings, rejected when a policy is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("retry_limit must be non-negative, got {0}")]
    NegativeLimit(i64),
    #[error("retry_limit {0} is out of range")]
    LimitTooLarge(i64),
    #[error("{field} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },
}

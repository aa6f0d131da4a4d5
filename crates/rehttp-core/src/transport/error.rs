//! Transport-level failures and their classification from curl errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retryable classes of [`TransportError`]. A retry policy picks which of
/// these it retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportErrorKind {
    Timeout,
    Connection,
    Transfer,
}

impl TransportErrorKind {
    pub const ALL: [TransportErrorKind; 3] = [
        TransportErrorKind::Timeout,
        TransportErrorKind::Connection,
        TransportErrorKind::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connection => "connection",
            TransportErrorKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown name passed to [`TransportErrorKind::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport error kind {0:?} (expected timeout, connection or transfer)")]
pub struct UnknownTransportErrorKind(pub String);

impl FromStr for TransportErrorKind {
    type Err = UnknownTransportErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timeout" => Ok(TransportErrorKind::Timeout),
            "connection" => Ok(TransportErrorKind::Connection),
            "transfer" => Ok(TransportErrorKind::Transfer),
            _ => Err(UnknownTransportErrorKind(s.to_string())),
        }
    }
}

/// A request that produced no HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connect or transfer timeout.
    #[error("timed out: {0}")]
    Timeout(#[source] curl::Error),
    /// Could not resolve, connect, or the connection broke mid-transfer.
    #[error("connection failed: {0}")]
    Connection(#[source] curl::Error),
    /// Any other failure reported by curl while performing the transfer.
    #[error("transfer failed: {0}")]
    Transfer(#[source] curl::Error),
    /// The request could not be built (malformed URL, bad header bytes).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The session backing this transport was already closed.
    #[error("session is closed")]
    SessionClosed,
}

impl TransportError {
    /// Classify a curl error reported by `perform()`.
    pub fn from_curl(e: curl::Error) -> Self {
        if e.is_url_malformed() || e.is_unsupported_protocol() {
            return TransportError::InvalidRequest(e.to_string());
        }
        if e.is_operation_timedout() {
            return TransportError::Timeout(e);
        }
        if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_ssl_connect_error()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
        {
            return TransportError::Connection(e);
        }
        TransportError::Transfer(e)
    }

    /// Errors raised while configuring the handle, before any I/O.
    pub(crate) fn setup(e: curl::Error) -> Self {
        TransportError::InvalidRequest(e.to_string())
    }

    /// Retryable class of this failure; `None` when repeating the same
    /// request cannot succeed.
    pub fn kind(&self) -> Option<TransportErrorKind> {
        match self {
            TransportError::Timeout(_) => Some(TransportErrorKind::Timeout),
            TransportError::Connection(_) => Some(TransportErrorKind::Connection),
            TransportError::Transfer(_) => Some(TransportErrorKind::Transfer),
            TransportError::InvalidRequest(_) | TransportError::SessionClosed => None,
        }
    }

    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_some()
    }
}

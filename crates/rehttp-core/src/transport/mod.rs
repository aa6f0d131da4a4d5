//! HTTP collaborator: the `send` contract the retry loop is built on.
//!
//! [`Transport`] sends one request and reports either a response (of any
//! status) or a [`TransportError`]. [`Session`] is the persistent variant
//! that owns connection and cookie state until closed. The curl-backed
//! implementations are [`CurlTransport`] and [`CurlSession`].

mod easy;
mod error;
mod options;
mod response;
mod session;

use std::fmt;
use std::str::FromStr;

pub use easy::CurlTransport;
pub use error::{TransportError, TransportErrorKind, UnknownTransportErrorKind};
pub use options::{Auth, RequestOptions};
pub use response::Response;
pub use session::CurlSession;

/// Sends a single request. No retries happen at this layer.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

/// A transport holding state across requests (live connections, cookies).
///
/// Thread-safety of concurrent `send` calls is whatever the implementation
/// provides; requesters add no locking on top.
pub trait Session: Transport {
    /// Release connections and session state. Later sends fail with
    /// [`TransportError::SessionClosed`]. Closing twice is a no-op.
    fn close(&mut self);
}

/// HTTP methods exposed as verb methods on requesters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown method name passed to [`Method::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// One logical request. Retries resend the same value unchanged.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub options: RequestOptions,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            method,
            url: url.into(),
            options,
        }
    }

    /// Fill in requester-wide defaults; values set on this request win.
    pub fn with_defaults(mut self, defaults: &RequestOptions) -> Self {
        self.options = self.options.merged_with(defaults);
        self
    }
}

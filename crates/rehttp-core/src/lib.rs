//! `rehttp-core`: blocking HTTP requests with fixed-delay retry.
//!
//! Two requesters share one retry loop:
//! - [`StatelessRequester`] issues every call on a fresh curl handle.
//! - [`SessionRequester`] issues every call (and every retry) through one
//!   persistent session so cookies and live connections carry over.
//!
//! Verb methods live on the [`Requester`] trait.

pub mod config;
pub mod logging;

mod api;
pub mod requester;
pub mod retry;
pub mod transport;

pub use api::{delete, get, head, options, patch, post, put, request};
pub use requester::{Requester, SessionRequester, StatelessRequester};
pub use retry::{
    CallControl, CancelReason, CancelToken, ConfigError, RequestError, RetryPolicy,
    DEFAULT_RETRY_CODES, DEFAULT_RETRY_DELAY, DEFAULT_RETRY_LIMIT, DEFAULT_RETRY_TRANSPORT,
};
pub use transport::{
    Auth, CurlSession, CurlTransport, Method, Request, RequestOptions, Response, Session,
    Transport, TransportError, TransportErrorKind,
};

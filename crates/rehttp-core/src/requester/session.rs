use std::fmt;
use std::sync::Arc;

use super::Requester;
use crate::retry::{run_with_retry, CallControl, RequestError, RetryPolicy};
use crate::transport::{CurlSession, Request, RequestOptions, Response, Session};

/// Issues every call, and every retry of a call, through one session so
/// cookies and negotiated connections accumulate.
///
/// The session is released by [`close`](Self::close) or when the requester
/// is dropped. Concurrent calls rely on the session's own thread-safety.
pub struct SessionRequester<S: Session = CurlSession> {
    policy: Arc<RetryPolicy>,
    defaults: RequestOptions,
    session: S,
    closed: bool,
}

impl SessionRequester<CurlSession> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_session(policy, CurlSession::new())
    }
}

impl Default for SessionRequester<CurlSession> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<S: Session> SessionRequester<S> {
    pub fn with_session(policy: RetryPolicy, session: S) -> Self {
        Self {
            policy: Arc::new(policy),
            defaults: RequestOptions::default(),
            session,
            closed: false,
        }
    }

    /// Headers, params and auth merged into every request made through
    /// this requester; per-request values take precedence.
    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &RequestOptions {
        &self.defaults
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Release the session now instead of at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.session.close();
            self.closed = true;
        }
    }
}

impl<S: Session> Requester for SessionRequester<S> {
    fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn send_with(&self, request: Request, control: &CallControl) -> Result<Response, RequestError> {
        let request = request.with_defaults(&self.defaults);
        run_with_retry(&self.policy, control, &request, || self.session.send(&request))
    }
}

impl<S: Session> Drop for SessionRequester<S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: Session + fmt::Debug> fmt::Debug for SessionRequester<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRequester")
            .field("policy", &self.policy)
            .field("defaults", &self.defaults)
            .field("session", &self.session)
            .finish()
    }
}

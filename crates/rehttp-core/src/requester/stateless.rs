use std::sync::Arc;

use super::Requester;
use crate::retry::{run_with_retry, CallControl, RequestError, RetryPolicy};
use crate::transport::{CurlTransport, Request, RequestOptions, Response, Transport};

/// Issues each call as an independent request; nothing is reused between
/// calls or between retries beyond what the transport does per call.
#[derive(Debug, Clone)]
pub struct StatelessRequester<T: Transport = CurlTransport> {
    policy: Arc<RetryPolicy>,
    defaults: RequestOptions,
    transport: T,
}

impl StatelessRequester<CurlTransport> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_transport(policy, CurlTransport::new())
    }
}

impl Default for StatelessRequester<CurlTransport> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<T: Transport> StatelessRequester<T> {
    pub fn with_transport(policy: RetryPolicy, transport: T) -> Self {
        Self {
            policy: Arc::new(policy),
            defaults: RequestOptions::default(),
            transport,
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

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Requester for StatelessRequester<T> {
    fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn send_with(&self, request: Request, control: &CallControl) -> Result<Response, RequestError> {
        let request = request.with_defaults(&self.defaults);
        run_with_retry(&self.policy, control, &request, || self.transport.send(&request))
    }
}

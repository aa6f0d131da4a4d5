//! Verb-level API over the retry loop.

mod session;
mod stateless;

pub use session::SessionRequester;
pub use stateless::StatelessRequester;

use crate::retry::{CallControl, RequestError, RetryPolicy};
use crate::transport::{Method, Request, RequestOptions, Response};

/// Verb methods shared by both requesters.
///
/// Every call blocks until the retry loop finishes. A response of any
/// status is `Ok`; only a transport failure on the last attempt (or a
/// cancellation) is an error.
pub trait Requester {
    fn policy(&self) -> &RetryPolicy;

    /// Run one logical request through the retry loop.
    fn send_with(&self, request: Request, control: &CallControl) -> Result<Response, RequestError>;

    fn send(&self, request: Request) -> Result<Response, RequestError> {
        self.send_with(request, &CallControl::default())
    }

    /// Raw escape hatch for an explicit method.
    fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, RequestError> {
        self.send(Request::new(method, url, options))
    }

    fn get(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Get, url, options)
    }

    fn head(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Head, url, options)
    }

    fn post(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Post, url, options)
    }

    fn put(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Put, url, options)
    }

    fn patch(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Patch, url, options)
    }

    fn delete(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Delete, url, options)
    }

    fn options(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
        self.request(Method::Options, url, options)
    }
}

#[cfg(test)]
mod tests;

//! One-off calls with the default retry policy and a fresh stateless requester.

use crate::requester::{Requester, StatelessRequester};
use crate::retry::RequestError;
use crate::transport::{Method, RequestOptions, Response};

pub fn request(
    method: Method,
    url: &str,
    options: RequestOptions,
) -> Result<Response, RequestError> {
    StatelessRequester::default().request(method, url, options)
}

pub fn get(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Get, url, options)
}

pub fn head(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Head, url, options)
}

pub fn post(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Post, url, options)
}

pub fn put(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Put, url, options)
}

pub fn patch(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Patch, url, options)
}

pub fn delete(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Delete, url, options)
}

pub fn options(url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    request(Method::Options, url, options)
}

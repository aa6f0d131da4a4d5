//! Retry loop: issue a request until the policy accepts its outcome.

use super::classify::Outcome;
use super::control::CallControl;
use super::error::RequestError;
use super::policy::{RetryDecision, RetryPolicy};
use crate::transport::{Request, Response, TransportError};

/// Runs `send` until the policy stops retrying, sleeping the policy's delay
/// between attempts on the calling thread.
///
/// The final outcome is returned as-is: a response of any status, or the
/// last transport error. `request` is only used for logging.
pub fn run_with_retry<F>(
    policy: &RetryPolicy,
    control: &CallControl,
    request: &Request,
    mut send: F,
) -> Result<Response, RequestError>
where
    F: FnMut() -> Result<Response, TransportError>,
{
    let mut attempts_made = 0u32;
    loop {
        if let Err(reason) = control.check() {
            tracing::warn!(
                "{} {} - {} before attempt {}",
                request.method,
                request.url,
                reason,
                attempts_made + 1
            );
            return Err(RequestError::Cancelled {
                attempts: attempts_made,
                reason,
            });
        }

        let result = send();
        match policy.decide(Outcome::of(&result), attempts_made) {
            RetryDecision::NoRetry => {
                return finish(request, result, attempts_made + 1);
            }
            RetryDecision::RetryAfter(delay) => {
                match &result {
                    Ok(response) => tracing::debug!(
                        "{} {} - response received {}, retrying in {:?} ({}/{})",
                        request.method,
                        request.url,
                        response.status(),
                        delay,
                        attempts_made + 1,
                        policy.retry_limit()
                    ),
                    Err(err) => tracing::debug!(
                        "{} {} - {}, retrying in {:?} ({}/{})",
                        request.method,
                        request.url,
                        err,
                        delay,
                        attempts_made + 1,
                        policy.retry_limit()
                    ),
                }
                if let Err(reason) = control.pause(delay) {
                    tracing::warn!(
                        "{} {} - {} while waiting to retry",
                        request.method,
                        request.url,
                        reason
                    );
                    return Err(RequestError::Cancelled {
                        attempts: attempts_made + 1,
                        reason,
                    });
                }
                attempts_made += 1;
            }
        }
    }
}

fn finish(
    request: &Request,
    result: Result<Response, TransportError>,
    attempts: u32,
) -> Result<Response, RequestError> {
    match result {
        Ok(response) => {
            tracing::info!(
                "{} {} - response received {} after {} attempt(s), returning response",
                request.method,
                request.url,
                response.status(),
                attempts
            );
            Ok(response)
        }
        Err(err) => {
            tracing::warn!(
                "{} {} - giving up after {} attempt(s): {}",
                request.method,
                request.url,
                attempts,
                err
            );
            Err(RequestError::Transport(err))
        }
    }
}

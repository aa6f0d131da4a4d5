//! Reduce one attempt's result to what the retry policy looks at.

use crate::transport::{Response, TransportError};

/// Outcome of a single attempt, as seen by [`RetryPolicy`](super::RetryPolicy).
///
/// Responses are reduced to their status code; transport failures are kept
/// whole so the policy can tell retryable failures from malformed requests.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// The collaborator returned a response with this status.
    Status(u16),
    /// The collaborator failed before a response was received.
    Transport(&'a TransportError),
}

impl<'a> Outcome<'a> {
    /// Classify the result of one `send` call.
    pub fn of(result: &'a Result<Response, TransportError>) -> Self {
        match result {
            Ok(response) => Outcome::Status(response.status()),
            Err(err) => Outcome::Transport(err),
        }
    }
}

//! Persistent curl session: one handle reused for every request.

use curl::easy::Easy;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::easy::perform;
use super::{Request, Response, Session, Transport, TransportError};

/// A curl handle kept alive across requests.
///
/// libcurl keeps live connections, the DNS cache and the in-memory cookie
/// jar on the handle, and `curl_easy_reset` between requests clears only
/// per-request options. Concurrent `send` calls are serialized on an
/// internal mutex; that is the only synchronisation provided.
pub struct CurlSession {
    handle: Mutex<Option<Easy>>,
}

impl CurlSession {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(Some(Easy::new())),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Default for CurlSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CurlSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurlSession")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Transport for CurlSession {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let easy = guard.as_mut().ok_or(TransportError::SessionClosed)?;
        easy.reset();
        // Empty cookie file turns on the cookie engine without reading a file.
        easy.cookie_file("").map_err(TransportError::setup)?;
        perform(easy, request)
    }
}

impl Session for CurlSession {
    fn close(&mut self) {
        let handle = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if handle.is_some() {
            tracing::debug!("curl session closed");
        }
        // Dropping the handle runs curl_easy_cleanup and closes its connections.
        drop(handle);
    }
}

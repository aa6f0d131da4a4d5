//! Per-request options handed to the transport without interpretation.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Credentials attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic authentication.
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Auth::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Headers, query parameters, auth, body and transport timeouts.
///
/// `None` fields fall back to the requester's defaults and then to the
/// transport's own defaults (curl follows redirects unless told otherwise).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub auth: Option<Auth>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter to the URL.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(Auth::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.auth(Auth::Bearer(token.into()))
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the body and set `Content-Type: application/json`
    /// unless a content type was already given.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        if self.header_value("content-type").is_none() {
            self.headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
        }
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    /// Case-insensitive header lookup (last value wins).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Layer these options over `defaults`.
    ///
    /// Default headers (matched case-insensitively) and params are kept only
    /// when this request does not set the same key. Auth, timeouts and the
    /// redirect flag fall back to the defaults when unset. The body is never
    /// inherited.
    pub fn merged_with(self, defaults: &RequestOptions) -> RequestOptions {
        let mut headers: Vec<(String, String)> = defaults
            .headers
            .iter()
            .filter(|(k, _)| !self.headers.iter().any(|(own, _)| own.eq_ignore_ascii_case(k)))
            .cloned()
            .collect();
        headers.extend(self.headers);

        let mut params: Vec<(String, String)> = defaults
            .params
            .iter()
            .filter(|(k, _)| !self.params.iter().any(|(own, _)| own == k))
            .cloned()
            .collect();
        params.extend(self.params);

        RequestOptions {
            headers,
            params,
            auth: self.auth.or_else(|| defaults.auth.clone()),
            body: self.body,
            timeout: self.timeout.or(defaults.timeout),
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            follow_redirects: self.follow_redirects.or(defaults.follow_redirects),
        }
    }
}

//! Stateless curl transport and the shared request/response plumbing.

use curl::easy::{Auth as CurlAuth, Easy, List};

use super::response::{parse_header_lines, Response};
use super::{Auth, Method, Request, Transport, TransportError};

const MAX_REDIRECTS: u32 = 10;

/// Sends every request on a fresh curl handle, so nothing (connections,
/// cookies) carries over between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut easy = Easy::new();
        perform(&mut easy, request)
    }
}

/// Configure `easy` for `request`, run the transfer on the current thread
/// and collect the response.
pub(super) fn perform(easy: &mut Easy, request: &Request) -> Result<Response, TransportError> {
    let url = build_url(&request.url, &request.options.params)?;
    configure(easy, request, &url).map_err(TransportError::setup)?;

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                // Non-UTF-8 bytes (e.g. Latin-1 values) become U+FFFD.
                header_lines.push(String::from_utf8_lossy(data).trim_end().to_string());
                true
            })
            .map_err(TransportError::setup)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(TransportError::setup)?;
        transfer.perform().map_err(TransportError::from_curl)?;
    }

    let status = easy.response_code().map_err(TransportError::from_curl)?;
    let status = u16::try_from(status)
        .map_err(|_| TransportError::InvalidRequest(format!("status code {status} out of range")))?;
    let effective_url = easy
        .effective_url()
        .ok()
        .flatten()
        .map(str::to_owned)
        .unwrap_or(url);

    Ok(Response::new(
        status,
        parse_header_lines(&header_lines),
        body,
        effective_url,
    ))
}

/// Validate the URL and append query parameters.
fn build_url(raw: &str, params: &[(String, String)]) -> Result<String, TransportError> {
    let mut parsed = url::Url::parse(raw)
        .map_err(|e| TransportError::InvalidRequest(format!("invalid URL {raw:?}: {e}")))?;
    if params.is_empty() {
        return Ok(raw.to_string());
    }
    parsed
        .query_pairs_mut()
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(parsed.into())
}

fn configure(easy: &mut Easy, request: &Request, url: &str) -> Result<(), curl::Error> {
    let opts = &request.options;
    easy.url(url)?;

    match request.method {
        Method::Get => easy.get(true)?,
        Method::Head => easy.nobody(true)?,
        Method::Post => {
            easy.post(true)?;
            easy.post_fields_copy(opts.body.as_deref().unwrap_or(&[]))?;
        }
        other => {
            easy.custom_request(other.as_str())?;
            if let Some(body) = &opts.body {
                easy.post_fields_copy(body)?;
            }
        }
    }

    easy.follow_location(opts.follow_redirects.unwrap_or(true))?;
    easy.max_redirections(MAX_REDIRECTS)?;
    if let Some(timeout) = opts.timeout {
        easy.timeout(timeout)?;
    }
    if let Some(timeout) = opts.connect_timeout {
        easy.connect_timeout(timeout)?;
    }

    // Build curl list for headers (e.g. "Name: value").
    let mut list = List::new();
    for (k, v) in &opts.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    match &opts.auth {
        Some(Auth::Basic { username, password }) => {
            easy.username(username)?;
            easy.password(password)?;
            let mut auth = CurlAuth::new();
            auth.basic(true);
            easy.http_auth(&auth)?;
        }
        Some(Auth::Bearer(token)) if opts.header_value("authorization").is_none() => {
            list.append(&format!("Authorization: Bearer {}", token.trim()))?;
        }
        _ => {}
    }
    easy.http_headers(list)?;

    Ok(())
}

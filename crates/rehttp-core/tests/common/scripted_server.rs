//! Minimal HTTP/1.1 server for integration tests.
//!
//! One request per connection (`Connection: close`). Routes:
//! - `/login` sets a `session` cookie.
//! - `/whoami` echoes the request's `Cookie` header (or `anonymous`).
//! - `/echo` echoes the request line, headers and body.
//! - `/latin1` answers with a header value that is not valid UTF-8.
//! - anything else answers with the next scripted status; the last repeats.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const SESSION_COOKIE: &str = "session=abc123";

/// Raw header line sent by `/latin1` ("café" in ISO-8859-1).
pub const LATIN1_HEADER: &[u8] = b"X-Name: caf\xE9\r\n";

pub struct ScriptedServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl ScriptedServer {
    /// Starts a server in a background thread. Runs until the process exits.
    pub fn start(statuses: &[u16]) -> Self {
        assert!(!statuses.is_empty(), "script must not be empty");
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let script = Arc::new(Mutex::new(statuses.to_vec()));
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_bg = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let script = Arc::clone(&script);
                let hits = Arc::clone(&hits_bg);
                thread::spawn(move || handle(stream, &script, &hits));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            hits,
        }
    }

    /// Absolute URL for `path` (must start with '/').
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Requests received so far, across all routes.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// A URL on which nothing listens: bind an ephemeral port, then release it.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

struct Incoming {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fn handle(mut stream: TcpStream, script: &Mutex<Vec<u16>>, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;

    let path = req.target.split('?').next().unwrap_or("");
    let (status, extra_headers, body) = match path {
        "/login" => (
            200,
            format!("Set-Cookie: {}; Path=/\r\n", SESSION_COOKIE).into_bytes(),
            b"logged in".to_vec(),
        ),
        "/latin1" => (200, LATIN1_HEADER.to_vec(), Vec::new()),
        "/whoami" => {
            let cookie = header(&req.headers, "cookie").unwrap_or("anonymous");
            (200, Vec::new(), cookie.as_bytes().to_vec())
        }
        "/echo" => {
            let mut out = format!("{} {}\n", req.method, req.target);
            for (k, v) in &req.headers {
                out.push_str(&format!("{}: {}\n", k.to_ascii_lowercase(), v));
            }
            out.push('\n');
            let mut out = out.into_bytes();
            out.extend_from_slice(&req.body);
            (
                200,
                b"Content-Type: text/plain; charset=utf-8\r\n".to_vec(),
                out,
            )
        }
        _ => {
            let mut script = script.lock().unwrap();
            let status = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0]
            };
            (status, Vec::new(), format!("attempt {}", hit).into_bytes())
        }
    };

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason(status),
        if req.method == "HEAD" { 0 } else { body.len() },
    )
    .into_bytes();
    head.extend_from_slice(&extra_headers);
    head.extend_from_slice(b"\r\n");
    let _ = stream.write_all(&head);
    if req.method != "HEAD" {
        let _ = stream.write_all(&body);
    }
    let _ = stream.flush();
}

fn read_request(stream: &mut TcpStream) -> Option<Incoming> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?;
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = header(&headers, "content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(Incoming {
        method,
        target,
        headers,
        body,
    })
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

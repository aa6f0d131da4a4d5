//! Requester tests against scripted in-memory transports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{Requester, SessionRequester, StatelessRequester};
use crate::retry::{CallControl, CancelReason, CancelToken, RequestError, RetryPolicy};
use crate::transport::{
    Method, Request, RequestOptions, Response, Session, Transport, TransportError,
    TransportErrorKind,
};

const COULDNT_CONNECT: u32 = 7;

#[derive(Debug, Clone, Copy)]
enum Step {
    Status(u16),
    Refused,
}

/// Plays back a fixed list of outcomes; the last one repeats.
#[derive(Debug)]
struct Scripted {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
    seen: Mutex<Vec<Request>>,
}

impl Scripted {
    fn new(steps: &[Step]) -> Self {
        Self {
            steps: Mutex::new(steps.iter().copied().collect()),
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            *steps.front().expect("script must not be empty")
        }
    }
}

impl Transport for Scripted {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        match self.next_step() {
            Step::Status(code) => Ok(Response::new(code, Vec::new(), Vec::new(), &request.url)),
            Step::Refused => Err(TransportError::from_curl(curl::Error::new(COULDNT_CONNECT))),
        }
    }
}

/// Session double: `/login` stores a cookie that every later send records.
#[derive(Debug)]
struct FakeSession {
    inner: Scripted,
    jar: Mutex<Option<String>>,
    observed: Mutex<Vec<Option<String>>>,
    closed: Arc<AtomicBool>,
}

impl FakeSession {
    fn new(steps: &[Step]) -> Self {
        Self {
            inner: Scripted::new(steps),
            jar: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Transport for FakeSession {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::SessionClosed);
        }
        self.observed
            .lock()
            .unwrap()
            .push(self.jar.lock().unwrap().clone());
        let result = self.inner.send(request);
        if request.url.ends_with("/login") && result.is_ok() {
            *self.jar.lock().unwrap() = Some("sid=1".to_string());
        }
        result
    }
}

impl Session for FakeSession {
    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn policy(limit: u32, codes: &[u16]) -> RetryPolicy {
    RetryPolicy::new(Duration::ZERO, limit, codes.iter().copied())
}

fn stateless(limit: u32, codes: &[u16], steps: &[Step]) -> StatelessRequester<Scripted> {
    StatelessRequester::with_transport(policy(limit, codes), Scripted::new(steps))
}

#[test]
fn persistent_transport_failure_makes_limit_plus_one_attempts() {
    for limit in [0u32, 1, 3] {
        let r = stateless(limit, &[429], &[Step::Refused]);
        let err = r.get("http://svc/", RequestOptions::new()).unwrap_err();
        assert_eq!(r.transport().calls(), limit + 1);
        assert!(matches!(err, RequestError::Transport(TransportError::Connection(_))));
    }
}

#[test]
fn retryable_statuses_then_success_returns_last_response() {
    for limit in [1u32, 2, 4] {
        let mut steps = vec![Step::Status(503); limit as usize];
        steps.push(Step::Status(200));
        let r = stateless(limit, &[503], &steps);
        let res = r.get("http://svc/", RequestOptions::new()).unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(r.transport().calls(), limit + 1);
    }
}

#[test]
fn zero_limit_makes_exactly_one_attempt() {
    let r = stateless(0, &[429], &[Step::Status(429), Step::Status(200)]);
    let res = r.post("http://svc/", RequestOptions::new()).unwrap();
    assert_eq!(res.status(), 429);
    assert_eq!(r.transport().calls(), 1);
}

#[test]
fn excluded_transport_kind_is_not_retried() {
    let r = StatelessRequester::with_transport(
        policy(3, &[429]).with_transport_kinds([TransportErrorKind::Timeout]),
        Scripted::new(&[Step::Refused, Step::Status(200)]),
    );
    let err = r.get("http://svc/", RequestOptions::new()).unwrap_err();
    assert!(matches!(err, RequestError::Transport(TransportError::Connection(_))));
    assert_eq!(r.transport().calls(), 1);
}

#[test]
fn status_outside_codes_returned_immediately() {
    let r = stateless(2, &[429], &[Step::Status(500), Step::Status(200)]);
    let res = r.get("http://svc/", RequestOptions::new()).unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(r.transport().calls(), 1);
}

#[test]
fn not_found_is_not_an_error() {
    let r = stateless(3, &[429], &[Step::Status(404)]);
    let res = r.delete("http://svc/item/1", RequestOptions::new()).unwrap();
    assert_eq!(res.status(), 404);
}

#[test]
fn transport_failure_then_success_recovers() {
    let r = stateless(2, &[429], &[Step::Refused, Step::Status(201)]);
    let res = r.put("http://svc/", RequestOptions::new()).unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(r.transport().calls(), 2);
}

#[test]
fn identical_config_and_script_give_identical_results() {
    let script = [
        Step::Status(429),
        Step::Refused,
        Step::Status(429),
        Step::Status(204),
    ];
    let a = stateless(5, &[429], &script);
    let b = stateless(5, &[429], &script);
    let ra = a.get("http://svc/", RequestOptions::new()).unwrap();
    let rb = b.get("http://svc/", RequestOptions::new()).unwrap();
    assert_eq!(ra, rb);
    assert_eq!(a.transport().calls(), b.transport().calls());
    assert_eq!(a.transport().calls(), 4);
}

#[test]
fn retry_scenario_waits_between_attempts() {
    let delay = Duration::from_millis(25);
    let r = StatelessRequester::with_transport(
        RetryPolicy::new(delay, 2, [429]),
        Scripted::new(&[Step::Status(429), Step::Status(429), Step::Status(200)]),
    );
    let start = Instant::now();
    let res = r.get("http://svc/", RequestOptions::new()).unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(r.transport().calls(), 3);
    assert!(start.elapsed() >= delay * 2);
}

#[test]
fn every_verb_sends_its_method() {
    let r = stateless(0, &[], &[Step::Status(200)]);
    let opts = RequestOptions::new;
    r.get("http://svc/", opts()).unwrap();
    r.head("http://svc/", opts()).unwrap();
    r.post("http://svc/", opts()).unwrap();
    r.put("http://svc/", opts()).unwrap();
    r.patch("http://svc/", opts()).unwrap();
    r.delete("http://svc/", opts()).unwrap();
    r.options("http://svc/", opts()).unwrap();
    let methods: Vec<Method> = r
        .transport()
        .seen
        .lock()
        .unwrap()
        .iter()
        .map(|req| req.method)
        .collect();
    assert_eq!(
        methods,
        vec![
            Method::Get,
            Method::Head,
            Method::Post,
            Method::Put,
            Method::Patch,
            Method::Delete,
            Method::Options,
        ]
    );
}

#[test]
fn defaults_are_merged_and_retries_resend_same_request() {
    let r = stateless(1, &[429], &[Step::Status(429), Step::Status(200)]).with_defaults(
        RequestOptions::new()
            .header("X-Client", "rehttp")
            .param("key", "default"),
    );
    r.get(
        "http://svc/",
        RequestOptions::new().param("key", "override").body("payload"),
    )
    .unwrap();
    let seen = r.transport().seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    for req in seen.iter() {
        assert_eq!(req.options.header_value("x-client"), Some("rehttp"));
        assert_eq!(
            req.options.params,
            vec![("key".to_string(), "override".to_string())]
        );
        assert_eq!(req.options.body.as_deref(), Some(&b"payload"[..]));
    }
}

#[test]
fn cancelled_call_reports_attempts() {
    let token = CancelToken::new();
    let r = StatelessRequester::with_transport(
        RetryPolicy::new(Duration::from_secs(30), 5, [429]),
        Scripted::new(&[Step::Status(429)]),
    );
    let canceller = {
        let token = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };
    let control = CallControl::new().with_cancel(token);
    let err = r
        .send_with(
            Request::new(Method::Get, "http://svc/", RequestOptions::new()),
            &control,
        )
        .unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(
        err,
        RequestError::Cancelled {
            attempts: 1,
            reason: CancelReason::Token
        }
    ));
    assert_eq!(r.transport().calls(), 1);
}

#[test]
fn session_state_carries_across_calls() {
    let r = SessionRequester::with_session(policy(2, &[429]), FakeSession::new(&[Step::Status(200)]));
    r.post("http://svc/login", RequestOptions::new()).unwrap();
    r.get("http://svc/whoami", RequestOptions::new()).unwrap();
    let observed = r.session().observed.lock().unwrap().clone();
    assert_eq!(observed, vec![None, Some("sid=1".to_string())]);
}

#[test]
fn session_retries_reuse_the_same_session() {
    let r = SessionRequester::with_session(
        policy(3, &[429]),
        FakeSession::new(&[
            Step::Status(200),
            Step::Status(429),
            Step::Refused,
            Step::Status(200),
        ]),
    );
    r.post("http://svc/login", RequestOptions::new()).unwrap();
    let res = r.get("http://svc/data", RequestOptions::new()).unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(r.session().inner.calls(), 4);
    let observed = r.session().observed.lock().unwrap().clone();
    assert_eq!(observed[1..].to_vec(), vec![Some("sid=1".to_string()); 3]);
}

#[test]
fn session_released_on_close_and_drop() {
    let session = FakeSession::new(&[Step::Status(200)]);
    let closed = Arc::clone(&session.closed);
    let r = SessionRequester::with_session(policy(0, &[]), session);
    assert!(!closed.load(Ordering::SeqCst));
    r.close();
    assert!(closed.load(Ordering::SeqCst));

    let session = FakeSession::new(&[Step::Status(200)]);
    let closed = Arc::clone(&session.closed);
    {
        let _r = SessionRequester::with_session(policy(0, &[]), session);
    }
    assert!(closed.load(Ordering::SeqCst));
}

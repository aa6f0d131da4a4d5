//! `rehttp send <url>...` – issue requests through a stateless or session requester.

use anyhow::{Context, Result};
use rehttp_core::config::RehttpConfig;
use rehttp_core::{
    CallControl, Request, RequestOptions, Requester, Response, RetryPolicy, SessionRequester,
    StatelessRequester,
};
use std::io::{self, Write};
use std::time::Duration;

use crate::cli::SendArgs;

pub fn run_send(args: &SendArgs, cfg: &RehttpConfig) -> Result<()> {
    let policy = build_policy(args, cfg)?;
    let defaults = cfg
        .request
        .to_options()
        .context("invalid [request] section in config")?;
    tracing::debug!("send with policy {:?}", policy);

    if args.session {
        let requester = SessionRequester::new(policy).with_defaults(defaults);
        let result = send_all(&requester, args);
        requester.close();
        result
    } else {
        let requester = StatelessRequester::new(policy).with_defaults(defaults);
        send_all(&requester, args)
    }
}

/// Config `[retry]` values, overridden by any retry flags on the command line.
pub(crate) fn build_policy(args: &SendArgs, cfg: &RehttpConfig) -> Result<RetryPolicy> {
    let mut retry = cfg.retry.clone();
    if let Some(limit) = args.retry_limit {
        retry.retry_limit = limit;
    }
    if let Some(delay) = args.retry_delay {
        retry.retry_delay_secs = delay;
    }
    if !args.retry_codes.is_empty() {
        retry.retry_codes = args.retry_codes.clone();
    }
    if args.no_retry_transport {
        retry.retry_transport.clear();
    } else if !args.retry_transport.is_empty() {
        retry.retry_transport = args.retry_transport.clone();
    }
    Ok(retry.to_policy()?)
}

pub(crate) fn build_options(args: &SendArgs) -> Result<RequestOptions> {
    let mut opts = RequestOptions::new();
    for raw in &args.headers {
        let (name, value) = raw
            .split_once(':')
            .with_context(|| format!("header {:?} is not in 'Name: value' form", raw))?;
        opts = opts.header(name.trim(), value.trim());
    }
    if let Some(data) = &args.data {
        opts = opts.body(data.as_bytes());
    }
    if let Some(secs) = args.timeout {
        opts = opts.timeout(secs_to_duration("--timeout", secs)?);
    }
    Ok(opts)
}

fn secs_to_duration(flag: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{} must be a non-negative number of seconds", flag))
}

fn send_all<R: Requester>(requester: &R, args: &SendArgs) -> Result<()> {
    let options = build_options(args)?;
    let deadline = args
        .deadline
        .map(|secs| secs_to_duration("--deadline", secs))
        .transpose()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for url in &args.urls {
        let control = match deadline {
            Some(d) => CallControl::new().with_timeout(d),
            None => CallControl::new(),
        };
        let request = Request::new(args.method, url.as_str(), options.clone());
        let response = requester
            .send_with(request, &control)
            .with_context(|| format!("{} {}", args.method, url))?;
        print_response(&mut out, &response, args.include)?;
    }
    Ok(())
}

fn print_response(out: &mut impl Write, response: &Response, include: bool) -> Result<()> {
    if include {
        writeln!(out, "HTTP {}", response.status())?;
        for (name, value) in response.headers() {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }
    out.write_all(response.body())?;
    out.flush()?;
    Ok(())
}

//! CLI for rehttp.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rehttp_core::config;
use rehttp_core::{Method, TransportErrorKind};

use commands::{run_config, run_send};

/// Top-level CLI for rehttp.
#[derive(Debug, Parser)]
#[command(name = "rehttp")]
#[command(about = "rehttp: HTTP requests with automatic fixed-delay retry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send a request to one or more URLs, retrying per the retry policy.
    Send(SendArgs),

    /// Print the config file path and the effective configuration.
    Config,
}

/// Arguments for `rehttp send`. Retry flags override `[retry]` in config.toml.
#[derive(Debug, Args)]
pub struct SendArgs {
    /// URLs to request, in order.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: Method,

    /// Extra header, e.g. -H 'Accept: application/json'. Repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Request body.
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Send all URLs through one session (cookies and connections are kept).
    #[arg(long)]
    pub session: bool,

    /// Additional attempts after the first.
    #[arg(long, allow_negative_numbers = true, value_name = "N")]
    pub retry_limit: Option<i64>,

    /// Seconds to wait between attempts.
    #[arg(long, allow_negative_numbers = true, value_name = "SECS")]
    pub retry_delay: Option<f64>,

    /// Status code that triggers a retry. Repeatable; replaces the configured set.
    #[arg(long = "retry-code", value_name = "CODE")]
    pub retry_codes: Vec<u16>,

    /// Transport failure kind that triggers a retry (timeout, connection,
    /// transfer). Repeatable; replaces the configured set.
    #[arg(long = "retry-transport", value_name = "KIND")]
    pub retry_transport: Vec<TransportErrorKind>,

    /// Never retry transport failures; only status codes are retried.
    #[arg(long, conflicts_with = "retry_transport")]
    pub no_retry_transport: bool,

    /// Per-attempt transfer timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Give up on a URL (including pending retries) after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<f64>,

    /// Print the status line and response headers before the body.
    #[arg(short = 'i', long)]
    pub include: bool,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Send(args) => run_send(&args, &cfg)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

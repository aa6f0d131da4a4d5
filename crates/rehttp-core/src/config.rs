use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::retry::duration_from_secs;
use crate::retry::{
    ConfigError, RetryPolicy, DEFAULT_RETRY_CODES, DEFAULT_RETRY_DELAY, DEFAULT_RETRY_LIMIT,
    DEFAULT_RETRY_TRANSPORT,
};
use crate::transport::{RequestOptions, TransportErrorKind};

/// Retry policy parameters (`[retry]` section in config.toml).
///
/// Kept loosely typed so that negative values from the file are reported
/// as [`ConfigError`] by [`to_policy`](Self::to_policy) instead of a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Seconds to wait between attempts (e.g. 0.25 = 250ms).
    pub retry_delay_secs: f64,
    /// Additional attempts after the first.
    pub retry_limit: i64,
    /// HTTP status codes that trigger a retry.
    pub retry_codes: Vec<u16>,
    /// Transport failures that trigger a retry: "timeout", "connection",
    /// "transfer". Empty disables retrying transport failures.
    pub retry_transport: Vec<TransportErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: DEFAULT_RETRY_DELAY.as_secs_f64(),
            retry_limit: i64::from(DEFAULT_RETRY_LIMIT),
            retry_codes: DEFAULT_RETRY_CODES.to_vec(),
            retry_transport: DEFAULT_RETRY_TRANSPORT.to_vec(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let policy = RetryPolicy::from_secs(
            self.retry_delay_secs,
            self.retry_limit,
            self.retry_codes.iter().copied(),
        )?;
        Ok(policy.with_transport_kinds(self.retry_transport.iter().copied()))
    }
}

/// Defaults applied to every request (`[request]` section in config.toml).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Whole-transfer timeout per attempt, in seconds.
    pub timeout_secs: Option<f64>,
    /// Connect timeout per attempt, in seconds.
    pub connect_timeout_secs: Option<f64>,
    /// Follow redirects (transport default: true).
    pub follow_redirects: Option<bool>,
    /// Headers sent with every request unless overridden.
    pub headers: BTreeMap<String, String>,
    /// Query parameters added to every request unless overridden.
    pub params: BTreeMap<String, String>,
}

impl RequestConfig {
    pub fn to_options(&self) -> Result<RequestOptions, ConfigError> {
        let timeout = self
            .timeout_secs
            .map(|s| duration_from_secs("timeout_secs", s))
            .transpose()?;
        let connect_timeout = self
            .connect_timeout_secs
            .map(|s| duration_from_secs("connect_timeout_secs", s))
            .transpose()?;
        Ok(RequestOptions {
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            params: self
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout,
            connect_timeout,
            follow_redirects: self.follow_redirects,
            ..RequestOptions::default()
        })
    }
}

/// Global configuration loaded from `~/.config/rehttp/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RehttpConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub request: RequestConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rehttp")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RehttpConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RehttpConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<RehttpConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RehttpConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

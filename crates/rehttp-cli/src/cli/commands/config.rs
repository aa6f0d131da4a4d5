//! `rehttp config` – show where the config lives and what it resolves to.

use anyhow::Result;
use rehttp_core::config::{self, RehttpConfig};

pub fn run_config(cfg: &RehttpConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    let policy = cfg.retry.to_policy()?;
    println!(
        "# effective: {} retries, {:?} apart, on {:?} and transport {:?}",
        policy.retry_limit(),
        policy.retry_delay(),
        policy.retry_codes(),
        policy.retry_transport()
    );
    Ok(())
}

//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, applying environment overrides for
//! secrets, validating all parameters, and providing clear error
//! messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::info;

use super::AppConfig;

/// Environment variable overriding `venue.username`.
pub const ENV_VENUE_USERNAME: &str = "BAYMARKETS_USERNAME";
/// Environment variable overriding `venue.password`.
pub const ENV_VENUE_PASSWORD: &str = "BAYMARKETS_PASSWORD";
/// Environment variable overriding `ledger.token`.
pub const ENV_LEDGER_TOKEN: &str = "LEDGER_TOKEN";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content, |key| std::env::var(key).ok())?;

  info!(
    party = %config.bridge.party,
    server_url = %config.venue.server_url,
    stream_url = %config.ledger.stream_url,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse, override and validate configuration from TOML text.
///
/// `env` looks up override variables; pass `|_| None` to disable.
pub fn parse_config<F>(content: &str, env: F) -> Result<AppConfig>
where
  F: Fn(&str) -> Option<String>,
{
  let mut config: AppConfig =
    toml::from_str(content).context("Failed to parse config.toml")?;

  apply_env_overrides(&mut config, env);
  validate_config(&config)?;

  Ok(config)
}

/// Replace secrets with environment values where present.
fn apply_env_overrides<F>(config: &mut AppConfig, env: F)
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(username) = env(ENV_VENUE_USERNAME) {
    config.venue.username = username;
  }
  if let Some(password) = env(ENV_VENUE_PASSWORD) {
    config.venue.password = password;
  }
  if let Some(token) = env(ENV_LEDGER_TOKEN) {
    config.ledger.token = Some(token);
  }

  // An empty token in the file means "no auth".
  if config.ledger.token.as_deref().is_some_and(str::is_empty) {
    config.ledger.token = None;
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.bridge.party.trim().is_empty(),
    "bridge.party must not be empty"
  );

  ensure_scheme("venue.server_url", &config.venue.server_url, &["http", "https"])?;
  anyhow::ensure!(
    !config.venue.username.is_empty(),
    "venue.username must be set (or {ENV_VENUE_USERNAME})"
  );

  ensure_scheme("ledger.stream_url", &config.ledger.stream_url, &["ws", "wss"])?;
  ensure_scheme("ledger.submit_url", &config.ledger.submit_url, &["http", "https"])?;
  anyhow::ensure!(
    config.ledger.event_buffer > 0,
    "ledger.event_buffer must be positive"
  );

  Ok(())
}

fn ensure_scheme(field: &str, value: &str, schemes: &[&str]) -> Result<()> {
  let url = Url::parse(value).with_context(|| format!("{field} is not a valid URL: {value:?}"))?;
  anyhow::ensure!(
    schemes.contains(&url.scheme()),
    "{field} must use one of {schemes:?}, got {:?}",
    url.scheme()
  );
  Ok(())
}

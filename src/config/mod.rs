//! Configuration Module - TOML-based Bridge Configuration
//!
//! Loads and validates configuration from `config.toml`, with
//! environment variable overrides for secrets. Configuration is read
//! once at startup and never mutated afterwards.

pub mod loader;

use std::fmt;

use serde::Deserialize;

/// Top-level bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Bridge identity and ledger party.
  pub bridge: BridgeConfig,
  /// Baymarkets venue endpoint and credentials.
  pub venue: VenueConfig,
  /// Ledger stream and submission endpoints.
  pub ledger: LedgerConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Bridge identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
  /// Human-readable bridge name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Integration party all created contracts are attributed to.
  pub party: String,
}

/// Venue configuration.
///
/// `username` and `password` are overridden by `BAYMARKETS_USERNAME`
/// and `BAYMARKETS_PASSWORD` when those are set.
#[derive(Clone, Deserialize)]
pub struct VenueConfig {
  /// Base server URL; endpoint paths are appended after a `/`.
  pub server_url: String,
  /// HTTP Basic username.
  #[serde(default)]
  pub username: String,
  /// HTTP Basic password.
  #[serde(default)]
  pub password: String,
}

impl fmt::Debug for VenueConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VenueConfig")
      .field("server_url", &self.server_url)
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Ledger endpoint configuration.
///
/// `token` is overridden by `LEDGER_TOKEN` when set.
#[derive(Clone, Deserialize)]
pub struct LedgerConfig {
  /// WebSocket URL streaming contract-created events.
  pub stream_url: String,
  /// HTTP URL accepting command batches.
  pub submit_url: String,
  /// Optional bearer token for both endpoints.
  #[serde(default)]
  pub token: Option<String>,
  /// Delay before reconnecting the event stream (seconds).
  #[serde(default = "default_reconnect_delay")]
  pub reconnect_delay_seconds: u64,
  /// Capacity of the event channel between stream and dispatcher.
  #[serde(default = "default_event_buffer")]
  pub event_buffer: usize,
}

impl fmt::Debug for LedgerConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LedgerConfig")
      .field("stream_url", &self.stream_url)
      .field("submit_url", &self.submit_url)
      .field("token", &self.token.as_ref().map(|_| "<redacted>"))
      .field("reconnect_delay_seconds", &self.reconnect_delay_seconds)
      .field("event_buffer", &self.event_buffer)
      .finish()
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "baymarkets-bridge".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_reconnect_delay() -> u64 {
  5
}

fn default_event_buffer() -> usize {
  1024
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}

//! Venue Authentication — HTTP Basic Credentials
//!
//! Builds the `Authorization: Basic …` header for every venue request
//! from the configured username and password. Credentials come from
//! config.toml or the BAYMARKETS_USERNAME / BAYMARKETS_PASSWORD env vars.

use std::fmt;

use anyhow::{Context, Result};
use base64::Engine;
use reqwest::header::HeaderValue;

use crate::config::VenueConfig;

/// Venue HTTP Basic credentials.
///
/// The password never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct VenueCredentials {
    /// Venue account name.
    username: String,
    /// Venue account password (never logged).
    password: String,
}

impl VenueCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Take credentials from the venue section of the configuration.
    pub fn from_config(config: &VenueConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    /// Get the username for logging.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Encode `username:password` as an `Authorization` header value.
    ///
    /// Format: `Basic base64(username ":" password)`. The value is
    /// marked sensitive so reqwest keeps it out of its own debug output.
    pub fn authorization_header(&self) -> Result<HeaderValue> {
        let raw = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
            .context("Venue credentials produce an invalid header value")?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for VenueCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header_encoding() {
        let creds = VenueCredentials::new("user", "pass");
        let header = creds.authorization_header().unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic dXNlcjpwYXNz");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_password_with_colon_is_kept_verbatim() {
        let creds = VenueCredentials::new("svc", "a:b");
        let header = creds.authorization_header().unwrap();
        // base64("svc:a:b")
        assert_eq!(header.to_str().unwrap(), "Basic c3ZjOmE6Yg==");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = VenueCredentials::new("svc", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("svc"));
        assert!(!rendered.contains("hunter2"));
    }
}

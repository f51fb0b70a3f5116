//! Venue Client Port - Baymarkets REST Interface
//!
//! Defines the trait the translator uses to reach the venue. An
//! implementation performs one authenticated request and returns the
//! parsed JSON body, whatever the HTTP status code.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::request::Endpoint;
use crate::error::Result;

/// Trait for venue REST clients.
///
/// Implementors attach HTTP Basic credentials, send an empty JSON
/// object as the body and decode the response body as JSON. No retry
/// is attempted; a failed call is reported to the caller as-is.
#[async_trait]
pub trait VenueClient: Send + Sync + 'static {
  /// Call a venue endpoint and return the decoded body.
  ///
  /// # Errors
  /// `BridgeError::Transport` when the request cannot be completed,
  /// `BridgeError::Decode` when the body is not JSON.
  async fn call(&self, endpoint: Endpoint) -> Result<Value>;
}

//! Baymarkets Venue Adapter
//!
//! Implements the `VenueClient` port over HTTPS with Basic auth.
//!
//! Sub-modules:
//! - `auth`: HTTP Basic credential handling
//! - `client`: reqwest client issuing the endpoint calls

pub mod auth;
pub mod client;

pub use auth::VenueCredentials;
pub use client::VenueHttpClient;

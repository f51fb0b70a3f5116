//! Error types for the request translation path.
//!
//! Venue-reported errors are not represented here: they become
//! `ErrorResponse` contracts. Everything below aborts the batch.

use thiserror::Error;

use crate::domain::request::{HttpMethod, RequestKind};

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("venue request {method} {path} failed: {source}")]
    Transport {
        method: HttpMethod,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("venue response from {path} is not valid JSON: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed {kind} response: {source}")]
    Malformed {
        kind: RequestKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON {expected} in the {kind} response, got {found}")]
    UnexpectedShape {
        kind: RequestKind,
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, BridgeError>;

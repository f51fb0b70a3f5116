//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (venue REST, ledger WebSocket and HTTP).
//!
//! Adapter categories:
//! - `ledger`: contract event stream and command batch submission
//! - `metrics`: Prometheus metrics export and health checks
//! - `venue`: Baymarkets REST client and Basic auth

pub mod ledger;
pub mod metrics;
pub mod venue;

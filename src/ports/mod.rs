//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `VenueClient`: Baymarkets REST calls
//! - `LedgerEventSource`: contract-created event intake
//! - `CommandSubmitter`: atomic command batch submission

pub mod ledger;
pub mod venue;

//! Domain layer - Contracts, commands and response translation.
//!
//! Pure types and functions for the bridge: ledger templates, the
//! request-kind endpoint map, command batches, and the mapping from
//! venue bodies to contracts. No I/O lives here (hexagonal inner ring).

pub mod commands;
pub mod contracts;
pub mod request;
pub mod translate;

// Re-export core types for convenience
pub use commands::{Command, CommandBatch};
pub use contracts::{Contract, ContractId, Party};
pub use request::{CreatedEvent, Endpoint, HttpMethod, RequestKind};

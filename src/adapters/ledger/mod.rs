//! Ledger Adapters - Event Stream and Command Submission
//!
//! WebSocket intake of request contracts and HTTP submission of the
//! resulting command batches.

pub mod stream;
pub mod submit;
pub mod wire;

pub use stream::LedgerStream;
pub use submit::HttpCommandSubmitter;

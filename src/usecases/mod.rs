//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! bridge's workflows.
//!
//! Use cases:
//! - `RequestTranslator`: one venue call per request, mapped to a batch
//! - `Dispatcher`: template routing, per-event tasks, batch submission

pub mod dispatcher;
pub mod translator;

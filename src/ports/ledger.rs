//! Ledger Ports - Event Intake and Command Submission
//!
//! The ledger runtime is an external collaborator. These traits are
//! the two seams the bridge needs from it: a source of contract-created
//! events and a sink accepting atomic command batches.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::domain::commands::CommandBatch;
use crate::domain::request::CreatedEvent;

/// Trait for ledger event sources.
///
/// Implementors deliver contract-created events for the configured
/// request templates until shutdown. Active contracts are re-delivered
/// after a reconnect, which is how failed requests get another attempt.
#[async_trait]
pub trait LedgerEventSource: Send + Sync + 'static {
  /// Stream created events into `events` until `shutdown` fires.
  async fn run(
    &self,
    events: mpsc::Sender<CreatedEvent>,
    shutdown: broadcast::Receiver<()>,
  ) -> anyhow::Result<()>;
}

/// Trait for ledger command submission.
///
/// A batch is applied atomically by the ledger or not at all.
#[async_trait]
pub trait CommandSubmitter: Send + Sync + 'static {
  /// Submit one batch as a single ledger transaction.
  async fn submit(&self, batch: &CommandBatch) -> anyhow::Result<()>;
}

//! Request Translator - Ledger Request → Venue Call → Command Batch
//!
//! One handler per request kind. Each handler makes exactly one venue
//! call and turns the body into a command batch that archives the
//! triggering request contract first. Handlers keep no state between
//! invocations and never retry.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::commands::CommandBatch;
use crate::domain::contracts::Party;
use crate::domain::request::RequestKind;
use crate::domain::translate;
use crate::error::Result;
use crate::ports::venue::VenueClient;

/// Translates request contracts into command batches via the venue.
pub struct RequestTranslator<V: VenueClient> {
  /// Venue REST client (carries server URL and credentials).
  venue: Arc<V>,
  /// Party every created contract is attributed to.
  party: Party,
}

impl<V: VenueClient> RequestTranslator<V> {
  /// Create a translator acting as `party`.
  pub fn new(venue: Arc<V>, party: impl Into<Party>) -> Self {
    Self {
      venue,
      party: party.into(),
    }
  }

  /// Dispatch to the handler for `kind`.
  ///
  /// # Errors
  /// Propagates transport, decode and malformed-response failures; no
  /// batch is produced in that case and the request stays active.
  pub async fn translate(&self, kind: RequestKind, request_cid: &str) -> Result<CommandBatch> {
    match kind {
      RequestKind::SystemStatus => self.handle_system_status(request_cid).await,
      RequestKind::ClearedPositions => self.handle_cleared_positions(request_cid).await,
      RequestKind::CollateralPositions => self.handle_collateral_positions(request_cid).await,
      RequestKind::MarginCalculation => self.handle_margin_calculation(request_cid).await,
      RequestKind::MarkToMarketCalculation => {
        self.handle_mark_to_market_calculation(request_cid).await
      }
    }
  }

  /// `GET system-status` → one `SystemStatus`.
  pub async fn handle_system_status(&self, request_cid: &str) -> Result<CommandBatch> {
    self.round_trip(RequestKind::SystemStatus, request_cid).await
  }

  /// `GET cleared-positions` → one `ClearedPosition` per array element.
  ///
  /// An error body is not recognised here and fails as malformed.
  pub async fn handle_cleared_positions(&self, request_cid: &str) -> Result<CommandBatch> {
    self.round_trip(RequestKind::ClearedPositions, request_cid).await
  }

  /// `GET collateral-positions` → one `CollateralPosition` per element,
  /// or one `ErrorResponse`.
  pub async fn handle_collateral_positions(&self, request_cid: &str) -> Result<CommandBatch> {
    self.round_trip(RequestKind::CollateralPositions, request_cid).await
  }

  /// `POST operations/margin-calculation` → `MarginCalculationResponse`
  /// or `ErrorResponse`.
  pub async fn handle_margin_calculation(&self, request_cid: &str) -> Result<CommandBatch> {
    self.round_trip(RequestKind::MarginCalculation, request_cid).await
  }

  /// `POST operations/mark-to-market-calculation` →
  /// `MarkToMarketCalculationResponse` or `ErrorResponse`.
  pub async fn handle_mark_to_market_calculation(
    &self,
    request_cid: &str,
  ) -> Result<CommandBatch> {
    self.round_trip(RequestKind::MarkToMarketCalculation, request_cid).await
  }

  #[instrument(skip(self), fields(kind = %kind))]
  async fn round_trip(&self, kind: RequestKind, request_cid: &str) -> Result<CommandBatch> {
    let endpoint = kind.endpoint();

    info!(
      method = %endpoint.method,
      path = endpoint.path,
      "Integration ==> Baymarkets"
    );

    let body = self.venue.call(endpoint).await?;

    info!(response = %body, "Integration <== Baymarkets");

    translate::translate(kind, &self.party, request_cid, &body)
  }
}

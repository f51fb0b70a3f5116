//! Ledger contract payloads created by the bridge.
//!
//! Field names serialize in camelCase to match the ledger templates.
//! Every contract carries the integration party that created it.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

// ────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────

/// Ledger party identifier.
pub type Party = String;

/// Ledger contract identifier.
pub type ContractId = String;

/// Fully qualified template identifiers in the `Baymarkets.Integration` module.
pub mod templates {
    pub const ERROR_RESPONSE: &str = "Baymarkets.Integration:ErrorResponse";
    pub const REQUEST_SYSTEM_STATUS: &str = "Baymarkets.Integration:RequestSystemStatus";
    pub const SYSTEM_STATUS: &str = "Baymarkets.Integration:ClaraSystemStatus";
    pub const REQUEST_CLEARED_POSITIONS: &str =
        "Baymarkets.Integration:RequestClearedPositions";
    pub const CLEARED_POSITION: &str = "Baymarkets.Integration:ClearedPosition";
    pub const REQUEST_COLLATERAL_POSITIONS: &str =
        "Baymarkets.Integration:RequestCollateralPositions";
    pub const COLLATERAL_POSITION: &str = "Baymarkets.Integration:CollateralPosition";
    pub const REQUEST_MARGIN_CALCULATION: &str =
        "Baymarkets.Integration:RequestMarginCalculation";
    pub const MARGIN_CALCULATION_RESPONSE: &str =
        "Baymarkets.Integration:MarginCalculationResponse";
    pub const REQUEST_MARK_TO_MARKET_CALCULATION: &str =
        "Baymarkets.Integration:RequestMarkToMarketCalculation";
    pub const MARK_TO_MARKET_CALCULATION_RESPONSE: &str =
        "Baymarkets.Integration:MarkToMarketCalculationResponse";
}

// ────────────────────────────────────────────
// Contract payloads
// ────────────────────────────────────────────

/// Venue system status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub integration_party: Party,
    pub environment: String,
    pub version: String,
    pub scm_revision: String,
}

/// One cleared position line per account, instrument and currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedPosition {
    pub integration_party: Party,
    pub account_id: String,
    pub instrument_id: String,
    pub currency_id: String,
    pub quantity_credit: Decimal,
    pub quantity_debit: Decimal,
    pub amount_credit: Decimal,
    pub amount_debit: Decimal,
}

/// Collateral held by an account in a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralPosition {
    pub integration_party: Party,
    pub account_id: String,
    pub asset_id: String,
    pub quantity: Decimal,
}

/// Acknowledgement of a triggered margin calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginCalculationResponse {
    pub integration_party: Party,
    pub calculation_id: String,
}

/// Acknowledgement of a triggered mark-to-market calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkToMarketCalculationResponse {
    pub integration_party: Party,
    pub calculation_id: String,
}

/// Error reported by the venue, copied from its error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub integration_party: Party,
    pub timestamp: String,
    pub status: i64,
    pub error: String,
    pub message: String,
    pub path: String,
}

/// Any contract the bridge can create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contract {
    SystemStatus(SystemStatus),
    ClearedPosition(ClearedPosition),
    CollateralPosition(CollateralPosition),
    MarginCalculationResponse(MarginCalculationResponse),
    MarkToMarketCalculationResponse(MarkToMarketCalculationResponse),
    ErrorResponse(ErrorResponse),
}

impl Contract {
    /// Template this contract is created from.
    pub const fn template_id(&self) -> &'static str {
        match self {
            Self::SystemStatus(_) => templates::SYSTEM_STATUS,
            Self::ClearedPosition(_) => templates::CLEARED_POSITION,
            Self::CollateralPosition(_) => templates::COLLATERAL_POSITION,
            Self::MarginCalculationResponse(_) => templates::MARGIN_CALCULATION_RESPONSE,
            Self::MarkToMarketCalculationResponse(_) => {
                templates::MARK_TO_MARKET_CALCULATION_RESPONSE
            }
            Self::ErrorResponse(_) => templates::ERROR_RESPONSE,
        }
    }

    /// JSON payload for ledger submission.
    pub fn payload(&self) -> serde_json::Result<Value> {
        match self {
            Self::SystemStatus(c) => serde_json::to_value(c),
            Self::ClearedPosition(c) => serde_json::to_value(c),
            Self::CollateralPosition(c) => serde_json::to_value(c),
            Self::MarginCalculationResponse(c) => serde_json::to_value(c),
            Self::MarkToMarketCalculationResponse(c) => serde_json::to_value(c),
            Self::ErrorResponse(c) => serde_json::to_value(c),
        }
    }

    pub const fn is_error_response(&self) -> bool {
        matches!(self, Self::ErrorResponse(_))
    }
}

//! Request kinds and the fixed venue endpoint map.
//!
//! Each request contract template on the ledger corresponds to exactly
//! one `RequestKind`, and each kind to exactly one venue endpoint.

use std::fmt;

use serde_json::Value;

use super::contracts::{templates, ContractId};

/// HTTP method used for a venue endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A venue endpoint: method plus path relative to the server URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

/// The five request contracts the bridge reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    SystemStatus,
    ClearedPositions,
    CollateralPositions,
    MarginCalculation,
    MarkToMarketCalculation,
}

impl RequestKind {
    /// Every request kind, in endpoint-table order.
    pub const ALL: [Self; 5] = [
        Self::SystemStatus,
        Self::ClearedPositions,
        Self::CollateralPositions,
        Self::MarginCalculation,
        Self::MarkToMarketCalculation,
    ];

    /// Ledger template of the request contract for this kind.
    pub const fn template_id(self) -> &'static str {
        match self {
            Self::SystemStatus => templates::REQUEST_SYSTEM_STATUS,
            Self::ClearedPositions => templates::REQUEST_CLEARED_POSITIONS,
            Self::CollateralPositions => templates::REQUEST_COLLATERAL_POSITIONS,
            Self::MarginCalculation => templates::REQUEST_MARGIN_CALCULATION,
            Self::MarkToMarketCalculation => {
                templates::REQUEST_MARK_TO_MARKET_CALCULATION
            }
        }
    }

    /// Venue endpoint called when a request of this kind is created.
    pub const fn endpoint(self) -> Endpoint {
        match self {
            Self::SystemStatus => Endpoint {
                method: HttpMethod::Get,
                path: "system-status",
            },
            Self::ClearedPositions => Endpoint {
                method: HttpMethod::Get,
                path: "cleared-positions",
            },
            Self::CollateralPositions => Endpoint {
                method: HttpMethod::Get,
                path: "collateral-positions",
            },
            Self::MarginCalculation => Endpoint {
                method: HttpMethod::Post,
                path: "operations/margin-calculation",
            },
            Self::MarkToMarketCalculation => Endpoint {
                method: HttpMethod::Post,
                path: "operations/mark-to-market-calculation",
            },
        }
    }

    /// Whether an `error` key in the venue body is turned into an
    /// `ErrorResponse` contract.
    ///
    /// System status and cleared positions never check: an error body
    /// there fails as a malformed response.
    pub const fn recognises_venue_errors(self) -> bool {
        matches!(
            self,
            Self::CollateralPositions
                | Self::MarginCalculation
                | Self::MarkToMarketCalculation
        )
    }

    /// Short label used in logs and metric labels.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SystemStatus => "system_status",
            Self::ClearedPositions => "cleared_positions",
            Self::CollateralPositions => "collateral_positions",
            Self::MarginCalculation => "margin_calculation",
            Self::MarkToMarketCalculation => "mark_to_market_calculation",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A contract-created event delivered by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEvent {
    /// Identifier of the newly created contract.
    pub contract_id: ContractId,
    /// Fully qualified template of the contract.
    pub template_id: String,
    /// Contract payload; request contracts carry nothing the bridge reads.
    pub payload: Value,
}

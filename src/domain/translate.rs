//! Venue response → ledger command mapping.
//!
//! Pure functions: given the request kind, the integration party, the
//! triggering contract id and the parsed venue body, build the command
//! batch. No I/O happens here, so identical inputs always produce
//! identical batches.
//!
//! Error-key handling differs across endpoints:
//! - collateral positions, margin and mark-to-market calculations turn
//!   an object body with an `error` key into one `ErrorResponse`;
//! - system status and cleared positions have no such branch, so an
//!   error body fails as a malformed response.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::commands::{Command, CommandBatch};
use super::contracts::{
    ClearedPosition, CollateralPosition, Contract, ErrorResponse,
    MarginCalculationResponse, MarkToMarketCalculationResponse, SystemStatus,
};
use super::request::RequestKind;
use crate::error::{BridgeError, Result};

/// Key whose presence marks a venue error body.
pub const ERROR_KEY: &str = "error";

// ────────────────────────────────────────────
// Venue response bodies
// ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemStatusBody {
    #[serde(deserialize_with = "de::text")]
    environment: String,
    #[serde(deserialize_with = "de::text")]
    version: String,
    #[serde(deserialize_with = "de::text")]
    scm_revision: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearedPositionBody {
    #[serde(deserialize_with = "de::text")]
    account_id: String,
    #[serde(deserialize_with = "de::text")]
    instrument_id: String,
    #[serde(deserialize_with = "de::text")]
    currency_id: String,
    quantity_credit: Decimal,
    quantity_debit: Decimal,
    amount_credit: Decimal,
    amount_debit: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollateralPositionBody {
    #[serde(deserialize_with = "de::text")]
    account_id: String,
    #[serde(deserialize_with = "de::text")]
    asset_id: String,
    quantity: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculationBody {
    #[serde(deserialize_with = "de::text")]
    calculation_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(deserialize_with = "de::text")]
    timestamp: String,
    #[serde(deserialize_with = "de::integer")]
    status: i64,
    #[serde(deserialize_with = "de::text")]
    error: String,
    #[serde(deserialize_with = "de::text")]
    message: String,
    #[serde(deserialize_with = "de::text")]
    path: String,
}

// ────────────────────────────────────────────
// Mapping
// ────────────────────────────────────────────

/// Build the full batch: archive of `request_cid` followed by the
/// creates derived from `body`.
///
/// # Errors
/// Fails without a partial batch when the body has the wrong shape or
/// lacks a field the mapping reads.
pub fn translate(
    kind: RequestKind,
    party: &str,
    request_cid: &str,
    body: &Value,
) -> Result<CommandBatch> {
    let mut batch = CommandBatch::archiving(request_cid);
    batch.extend(map_response(kind, party, body)?);
    Ok(batch)
}

/// Map a venue body to the create commands for `kind`.
pub fn map_response(kind: RequestKind, party: &str, body: &Value) -> Result<Vec<Command>> {
    if kind.recognises_venue_errors() && has_error_key(body) {
        let error = error_response(kind, party, body)?;
        return Ok(vec![Command::create(Contract::ErrorResponse(error))]);
    }

    match kind {
        RequestKind::SystemStatus => {
            let status: SystemStatusBody = parse(kind, body)?;
            Ok(vec![Command::create(Contract::SystemStatus(SystemStatus {
                integration_party: party.to_string(),
                environment: status.environment,
                version: status.version,
                scm_revision: status.scm_revision,
            }))])
        }
        RequestKind::ClearedPositions => elements(kind, body)?
            .iter()
            .map(|element| -> Result<Command> {
                let position: ClearedPositionBody = parse(kind, element)?;
                Ok(Command::create(Contract::ClearedPosition(ClearedPosition {
                    integration_party: party.to_string(),
                    account_id: position.account_id,
                    instrument_id: position.instrument_id,
                    currency_id: position.currency_id,
                    quantity_credit: position.quantity_credit,
                    quantity_debit: position.quantity_debit,
                    amount_credit: position.amount_credit,
                    amount_debit: position.amount_debit,
                })))
            })
            .collect(),
        RequestKind::CollateralPositions => elements(kind, body)?
            .iter()
            .map(|element| -> Result<Command> {
                let position: CollateralPositionBody = parse(kind, element)?;
                Ok(Command::create(Contract::CollateralPosition(
                    CollateralPosition {
                        integration_party: party.to_string(),
                        account_id: position.account_id,
                        asset_id: position.asset_id,
                        quantity: position.quantity,
                    },
                )))
            })
            .collect(),
        RequestKind::MarginCalculation => {
            let calc: CalculationBody = parse(kind, body)?;
            Ok(vec![Command::create(Contract::MarginCalculationResponse(
                MarginCalculationResponse {
                    integration_party: party.to_string(),
                    calculation_id: calc.calculation_id,
                },
            ))])
        }
        RequestKind::MarkToMarketCalculation => {
            let calc: CalculationBody = parse(kind, body)?;
            Ok(vec![Command::create(
                Contract::MarkToMarketCalculationResponse(MarkToMarketCalculationResponse {
                    integration_party: party.to_string(),
                    calculation_id: calc.calculation_id,
                }),
            )])
        }
    }
}

/// Build an `ErrorResponse` from a venue error body.
///
/// All five fields are required; `status` may arrive as a number or a
/// numeric string. A bare `{"error": "validation"}` therefore does not
/// produce an `ErrorResponse` with blank fields: it fails as
/// `Malformed`, no batch is submitted and the request stays active.
pub fn error_response(kind: RequestKind, party: &str, body: &Value) -> Result<ErrorResponse> {
    let error: ErrorBody = parse(kind, body)?;
    Ok(ErrorResponse {
        integration_party: party.to_string(),
        timestamp: error.timestamp,
        status: error.status,
        error: error.error,
        message: error.message,
        path: error.path,
    })
}

/// Whether `body` is an object carrying the `error` key.
pub fn has_error_key(body: &Value) -> bool {
    body.as_object().is_some_and(|o| o.contains_key(ERROR_KEY))
}

/// JSON type name of a value, for shape errors.
pub const fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse<'a, T: Deserialize<'a>>(kind: RequestKind, value: &'a Value) -> Result<T> {
    T::deserialize(value).map_err(|source| BridgeError::Malformed { kind, source })
}

fn elements(kind: RequestKind, body: &Value) -> Result<&[Value]> {
    body.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| BridgeError::UnexpectedShape {
            kind,
            expected: "array",
            found: shape_of(body),
        })
}

mod de {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Text field; numbers are rendered to their decimal form.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected a string or number, got {}",
                super::shape_of(&other)
            ))),
        }
    }

    /// Integer field; floats truncate toward zero, numeric strings parse.
    #[allow(clippy::cast_possible_truncation)]
    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .ok_or_else(|| D::Error::custom(format!("integer out of range: {n}"))),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| D::Error::custom(format!("invalid integer {s:?}: {e}"))),
            other => Err(D::Error::custom(format!(
                "expected an integer, got {}",
                super::shape_of(&other)
            ))),
        }
    }
}

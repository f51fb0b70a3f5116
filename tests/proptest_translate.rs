//! Property-Based Tests — Response Translation Invariants
//!
//! Uses `proptest` to verify that batch construction keeps its shape
//! across random venue bodies.

use proptest::prelude::*;
use serde_json::{json, Value};

use baymarkets_bridge::domain::contracts::Contract;
use baymarkets_bridge::domain::request::RequestKind;
use baymarkets_bridge::domain::translate::translate;

const PARTY: &str = "Baymarkets::1220abcd";

fn collateral_element() -> impl Strategy<Value = Value> {
    ("[A-Z]{2}-[0-9]{1,4}", "[A-Z]{3}", -1_000_000i64..1_000_000, 0u32..4).prop_map(
        |(account, asset, units, scale)| {
            json!({
                "accountId": account,
                "assetId": asset,
                "quantity": rust_decimal::Decimal::new(units, scale).to_string(),
            })
        },
    )
}

fn cid() -> impl Strategy<Value = String> {
    "#[0-9]{1,6}:[0-9]{1,2}"
}

// ── Batch Shape Properties ──────────────────────────────────

proptest! {
    /// N array elements give N creates after exactly one archive.
    #[test]
    fn collateral_batch_is_archive_plus_one_create_per_element(
        elements in prop::collection::vec(collateral_element(), 0..20),
        request_cid in cid(),
    ) {
        let body = Value::Array(elements.clone());
        let batch = translate(RequestKind::CollateralPositions, PARTY, &request_cid, &body).unwrap();

        prop_assert_eq!(batch.len(), elements.len() + 1);
        prop_assert!(batch.commands()[0].archives(&request_cid));
        prop_assert_eq!(
            batch.commands().iter().filter(|c| c.archives(&request_cid)).count(),
            1
        );

        for (created, element) in batch.created().zip(&elements) {
            match created {
                Contract::CollateralPosition(p) => {
                    prop_assert_eq!(&p.integration_party, PARTY);
                    prop_assert_eq!(Some(p.account_id.as_str()), element["accountId"].as_str());
                    let quantity = p.quantity.to_string();
                    prop_assert_eq!(Some(quantity.as_str()), element["quantity"].as_str());
                }
                other => prop_assert!(false, "unexpected contract {:?}", other),
            }
        }
    }

    /// Any body carrying an error key yields exactly one ErrorResponse
    /// for the endpoints that recognise venue errors.
    #[test]
    fn error_body_yields_single_error_response(
        status in 400i64..600,
        message in "[a-z ]{0,40}",
        kind in prop::sample::select(vec![
            RequestKind::CollateralPositions,
            RequestKind::MarginCalculation,
            RequestKind::MarkToMarketCalculation,
        ]),
        request_cid in cid(),
    ) {
        let body = json!({
            "timestamp": "2020-07-10T12:00:00.000+0000",
            "status": status,
            "error": "Bad Request",
            "message": message,
            "path": format!("/api/{}", kind.endpoint().path),
        });

        let batch = translate(kind, PARTY, &request_cid, &body).unwrap();

        prop_assert_eq!(batch.len(), 2);
        prop_assert!(batch.has_error_response());
        prop_assert!(batch.commands()[0].archives(&request_cid));
    }

    /// Translation is a pure function of its inputs.
    #[test]
    fn translation_is_deterministic(
        elements in prop::collection::vec(collateral_element(), 0..8),
        request_cid in cid(),
    ) {
        let body = Value::Array(elements);
        let first = translate(RequestKind::CollateralPositions, PARTY, &request_cid, &body).unwrap();
        let second = translate(RequestKind::CollateralPositions, PARTY, &request_cid, &body).unwrap();
        prop_assert_eq!(first, second);
    }
}

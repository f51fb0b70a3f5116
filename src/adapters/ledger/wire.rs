//! Ledger Wire Types - Stream Messages and Submission Bodies
//!
//! JSON shapes exchanged with the ledger gateway:
//! - stream query: `[{"templateIds": [...]}]`
//! - stream message: `{"events": [{"created": {...}} | {"archived": {...}}], "offset": ...}`
//! - submission: `{"commandId", "actAs", "commands": [{"create": ...} | {"exercise": ...}]}`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::commands::{Command, CommandBatch};
use crate::domain::request::CreatedEvent;

/// Created event as reported by the stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCreated {
    pub contract_id: String,
    pub template_id: String,
    #[serde(default)]
    pub payload: Value,
}

/// Archived event as reported by the stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireArchived {
    pub contract_id: String,
    #[serde(default)]
    pub template_id: String,
}

/// One entry of a stream message's `events` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireEvent {
    Created(WireCreated),
    Archived(WireArchived),
}

/// A single text frame from the ledger stream.
#[derive(Debug, Default, Deserialize)]
pub struct StreamMessage {
    #[serde(default)]
    pub events: Vec<WireEvent>,
    /// Ledger offset once the active contract set has been sent.
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub warnings: Option<Value>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl StreamMessage {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid ledger stream JSON")
    }

    /// Created events in stream order.
    pub fn into_created(self) -> Vec<CreatedEvent> {
        self.events
            .into_iter()
            .filter_map(|event| match event {
                WireEvent::Created(c) => Some(CreatedEvent {
                    contract_id: c.contract_id,
                    template_id: c.template_id,
                    payload: c.payload,
                }),
                WireEvent::Archived(_) => None,
            })
            .collect()
    }
}

/// Query frame subscribing to `template_ids`.
pub fn stream_query(template_ids: &[&str]) -> String {
    json!([{ "templateIds": template_ids }]).to_string()
}

/// Body of a batch submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub command_id: String,
    pub act_as: Vec<String>,
    pub commands: Vec<Value>,
}

impl SubmitRequest {
    /// Encode `batch` for submission as `party`.
    pub fn new(command_id: String, party: &str, batch: &CommandBatch) -> Result<Self> {
        let commands = batch
            .commands()
            .iter()
            .map(encode_command)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            command_id,
            act_as: vec![party.to_string()],
            commands,
        })
    }
}

/// Encode a single command.
pub fn encode_command(command: &Command) -> Result<Value> {
    Ok(match command {
        Command::Exercise {
            contract_id,
            choice,
            argument,
        } => json!({
            "exercise": {
                "contractId": contract_id,
                "choice": choice,
                "argument": argument,
            }
        }),
        Command::Create(contract) => json!({
            "create": {
                "templateId": contract.template_id(),
                "payload": contract
                    .payload()
                    .with_context(|| format!("Failed to encode {}", contract.template_id()))?,
            }
        }),
    })
}

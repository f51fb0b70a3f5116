//! Ledger Command Submitter - HTTP Batch Submission
//!
//! Posts each `CommandBatch` as one ledger transaction, acting as the
//! integration party. A fresh command id is generated per submission.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::wire::SubmitRequest;
use crate::config::LedgerConfig;
use crate::domain::commands::CommandBatch;
use crate::domain::contracts::Party;
use crate::ports::ledger::CommandSubmitter;

/// reqwest-backed implementation of the `CommandSubmitter` port.
pub struct HttpCommandSubmitter {
    http: Client,
    url: String,
    token: Option<String>,
    party: Party,
}

impl HttpCommandSubmitter {
    pub fn new(config: &LedgerConfig, party: Party) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(5)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: config.submit_url.clone(),
            token: config.token.clone(),
            party,
        })
    }
}

#[async_trait]
impl CommandSubmitter for HttpCommandSubmitter {
    #[instrument(skip_all, fields(commands = batch.len()))]
    async fn submit(&self, batch: &CommandBatch) -> Result<()> {
        let command_id = Uuid::new_v4().to_string();
        let body = SubmitRequest::new(command_id.clone(), &self.party, batch)?;

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Ledger submission request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ledger rejected batch {command_id} ({status}): {text}");
        }

        debug!(command_id = %command_id, "Batch accepted by ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::commands::Command;
    use crate::domain::contracts::{Contract, MarginCalculationResponse};

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn capture(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let rejected = body["actAs"][0] == "Rejected";
        captured.lock().unwrap().push((auth, body));
        if rejected {
            StatusCode::CONFLICT
        } else {
            StatusCode::OK
        }
    }

    async fn spawn_ledger() -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/submit", post(capture))
            .with_state(Arc::clone(&captured));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1/submit"), captured)
    }

    fn config(url: &str, token: Option<&str>) -> LedgerConfig {
        LedgerConfig {
            stream_url: "ws://127.0.0.1:1/v1/stream/query".to_string(),
            submit_url: url.to_string(),
            token: token.map(str::to_string),
            reconnect_delay_seconds: 5,
            event_buffer: 16,
        }
    }

    fn batch() -> CommandBatch {
        let mut batch = CommandBatch::archiving("#3:1");
        batch.push(Command::create(Contract::MarginCalculationResponse(
            MarginCalculationResponse {
                integration_party: "Bridge".to_string(),
                calculation_id: "C-9".to_string(),
            },
        )));
        batch
    }

    #[tokio::test]
    async fn test_submit_posts_batch_with_bearer_token() {
        let (url, captured) = spawn_ledger().await;
        let submitter =
            HttpCommandSubmitter::new(&config(&url, Some("jwt-1")), "Bridge".to_string()).unwrap();

        submitter.submit(&batch()).await.unwrap();

        let captured = captured.lock().unwrap();
        let (auth, body) = &captured[0];
        assert_eq!(auth.as_deref(), Some("Bearer jwt-1"));
        assert_eq!(body["actAs"], json!(["Bridge"]));
        assert_eq!(body["commands"].as_array().unwrap().len(), 2);
        assert_eq!(body["commands"][0]["exercise"]["choice"], "Archive");
        assert!(Uuid::parse_str(body["commandId"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_submit_uses_fresh_command_ids() {
        let (url, captured) = spawn_ledger().await;
        let submitter = HttpCommandSubmitter::new(&config(&url, None), "Bridge".to_string()).unwrap();

        submitter.submit(&batch()).await.unwrap();
        submitter.submit(&batch()).await.unwrap();

        let captured = captured.lock().unwrap();
        assert_eq!(captured[0].0, None);
        assert_ne!(captured[0].1["commandId"], captured[1].1["commandId"]);
    }

    #[tokio::test]
    async fn test_submit_rejection_is_error() {
        let (url, _captured) = spawn_ledger().await;
        let submitter =
            HttpCommandSubmitter::new(&config(&url, None), "Rejected".to_string()).unwrap();

        let err = submitter.submit(&batch()).await.unwrap_err();
        assert!(err.to_string().contains("409"));
    }
}

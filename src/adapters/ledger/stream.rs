//! Ledger Event Stream - WebSocket Contract Feed
//!
//! Subscribes to the request templates over the ledger's WebSocket
//! query endpoint and forwards every contract-created event to the
//! dispatcher channel.
//!
//! Features:
//! - Optional JWT carried in `Sec-WebSocket-Protocol`
//! - Auto-reconnect on disconnect (configurable delay, default 5s)
//! - Active contracts are re-sent by the ledger after each reconnect
//! - Event-driven via tokio::select!

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument, warn};

use super::wire::{stream_query, StreamMessage};
use crate::adapters::metrics::MetricsRegistry;
use crate::config::LedgerConfig;
use crate::domain::request::CreatedEvent;
use crate::ports::ledger::LedgerEventSource;

/// How a single session ended without a transport error.
enum SessionEnd {
    /// Shutdown signal received.
    Shutdown,
    /// Dispatcher dropped its receiver.
    ChannelClosed,
}

/// WebSocket implementation of the `LedgerEventSource` port.
pub struct LedgerStream {
    /// Query endpoint URL.
    url: String,
    /// Optional ledger access token.
    token: Option<String>,
    /// Templates to subscribe to.
    template_ids: Vec<&'static str>,
    /// Pause between sessions.
    reconnect_delay: Duration,
    /// Shared with the health server.
    connected: Arc<AtomicBool>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl LedgerStream {
    pub fn new(config: &LedgerConfig, template_ids: Vec<&'static str>) -> Self {
        Self {
            url: config.stream_url.clone(),
            token: config.token.clone(),
            template_ids,
            reconnect_delay: Duration::from_secs(config.reconnect_delay_seconds),
            connected: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Mirror connectivity into the `ledger_connected` gauge.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Connectivity flag, for the readiness probe.
    pub fn connection_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
        if let Some(m) = &self.metrics {
            m.ledger_connected.set(i64::from(connected));
        }
    }

    /// Build the upgrade request, attaching the token when configured.
    fn upgrade_request(
        &self,
    ) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .context("Invalid ledger stream URL")?;

        if let Some(token) = &self.token {
            let protocols = HeaderValue::from_str(&format!("jwt.token.{token}, daml.ws.auth"))
                .context("Ledger token is not a valid header value")?;
            request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, protocols);
        }

        Ok(request)
    }

    /// Single session: connect, send the query, forward events.
    async fn connect_and_stream(
        &self,
        events: &mpsc::Sender<CreatedEvent>,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> Result<SessionEnd> {
        let (ws_stream, _) = connect_async(self.upgrade_request()?)
            .await
            .context("Ledger WebSocket connection failed")?;

        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(stream_query(&self.template_ids)))
            .await
            .context("Failed to send ledger stream query")?;

        self.set_connected(true);
        info!(templates = self.template_ids.len(), "Ledger stream connected");

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal in ledger stream");
                    let _ = write.close().await;
                    return Ok(SessionEnd::Shutdown);
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !forward(&text, events).await? {
                                return Ok(SessionEnd::ChannelClosed);
                            }
                        }
                        Some(Ok(Message::Ping(_))) => {
                            debug!("Ledger ping received");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            return Err(anyhow::anyhow!("Ledger closed the stream: {frame:?}"));
                        }
                        Some(Err(e)) => {
                            return Err(anyhow::anyhow!("Ledger WS error: {e}"));
                        }
                        None => {
                            return Err(anyhow::anyhow!("Ledger WS stream ended"));
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

/// Parse one frame and push its created events into `events`.
///
/// Returns `false` once the receiving side has gone away. A frame the
/// ledger marks as an error ends the session.
async fn forward(text: &str, events: &mpsc::Sender<CreatedEvent>) -> Result<bool> {
    let message = match StreamMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "Skipping unparseable ledger frame");
            return Ok(true);
        }
    };

    if !message.errors.is_empty() {
        anyhow::bail!("Ledger stream reported errors: {}", message.errors.join("; "));
    }
    if let Some(warnings) = &message.warnings {
        warn!(%warnings, "Ledger stream warnings");
    }
    if let Some(offset) = &message.offset {
        debug!(%offset, "Ledger stream offset");
    }

    for event in message.into_created() {
        debug!(template = %event.template_id, cid = %event.contract_id, "Contract created");
        if events.send(event).await.is_err() {
            return Ok(false);
        }
    }

    Ok(true)
}

#[async_trait]
impl LedgerEventSource for LedgerStream {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn run(
        &self,
        events: mpsc::Sender<CreatedEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        info!("Connecting to ledger stream");

        loop {
            let session = self.connect_and_stream(&events, &mut shutdown).await;
            self.set_connected(false);

            match session {
                Ok(SessionEnd::Shutdown) => {
                    info!("Ledger stream shut down gracefully");
                    return Ok(());
                }
                Ok(SessionEnd::ChannelClosed) => {
                    info!("Event channel closed, stopping ledger stream");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        delay_secs = self.reconnect_delay.as_secs(),
                        "Ledger stream disconnected, reconnecting"
                    );
                    tokio::select! {
                        _ = shutdown.recv() => return Ok(()),
                        _ = tokio::time::sleep(self.reconnect_delay) => {},
                    }
                }
            }
        }
    }
}

//! Prometheus Metrics Registry - Bridge Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards:
//! per-kind request outcomes, venue round-trip latency, submission
//! failures and ledger stream connectivity.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::domain::request::RequestKind;

/// Outcome label values for `baymarkets_bridge_requests_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Domain contracts created.
    Success,
    /// Venue reported an error; an `ErrorResponse` was created.
    VenueError,
    /// Translation or submission failed; the request stays active.
    Failed,
}

impl RequestOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::VenueError => "venue_error",
            Self::Failed => "failed",
        }
    }
}

/// Centralized Prometheus metrics for the bridge.
///
/// All metrics follow the naming convention `baymarkets_bridge_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Handled requests by kind and outcome.
    pub requests: IntCounterVec,
    /// Venue round-trip latency in seconds, by kind.
    pub venue_latency: HistogramVec,
    /// Batches the ledger refused or that could not be sent.
    pub submit_failures: IntCounter,
    /// Ledger stream connection status (1 = connected, 0 = disconnected).
    pub ledger_connected: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "baymarkets_bridge_requests_total",
                "Request contracts handled, by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;

        let venue_latency = HistogramVec::new(
            HistogramOpts::new(
                "baymarkets_bridge_venue_latency_seconds",
                "Venue round-trip latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["kind"],
        )?;

        let submit_failures = IntCounter::new(
            "baymarkets_bridge_submit_failures_total",
            "Command batches that failed ledger submission",
        )?;

        let ledger_connected = IntGauge::new(
            "baymarkets_bridge_ledger_connected",
            "Ledger stream connection status (1=connected, 0=disconnected)",
        )?;

        // Register all metrics
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(venue_latency.clone()))?;
        registry.register(Box::new(submit_failures.clone()))?;
        registry.register(Box::new(ledger_connected.clone()))?;

        Ok(Self {
            registry,
            requests,
            venue_latency,
            submit_failures,
            ledger_connected,
        })
    }

    /// Count one handled request.
    pub fn record_request(&self, kind: RequestKind, outcome: RequestOutcome) {
        self.requests
            .with_label_values(&[kind.label(), outcome.label()])
            .inc();
    }

    /// Observe one venue round trip.
    pub fn observe_latency(&self, kind: RequestKind, seconds: f64) {
        self.venue_latency
            .with_label_values(&[kind.label()])
            .observe(seconds);
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    metrics.render().map_err(|e| {
                        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                    })
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

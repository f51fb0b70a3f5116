//! Baymarkets Ledger Bridge — Entry Point
//!
//! Watches the ledger for request contracts, answers each with one
//! Baymarkets REST call, and writes the result back as a single
//! atomic command batch. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config (path from BRIDGE_CONFIG, default config.toml) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create VenueHttpClient (Basic auth from config / env)
//! 4. Create HttpCommandSubmitter and LedgerStream
//! 5. Spawn metrics server (:9090) and health server (/live + /ready)
//! 6. Spawn ledger stream (auto-reconnect WebSocket)
//! 7. Spawn dispatcher (one task per request contract)
//! 8. Wait for SIGINT → graceful shutdown (stop intake → drain → exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

use baymarkets_bridge::adapters::ledger::{HttpCommandSubmitter, LedgerStream};
use baymarkets_bridge::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use baymarkets_bridge::adapters::venue::VenueHttpClient;
use baymarkets_bridge::config;
use baymarkets_bridge::ports::ledger::LedgerEventSource;
use baymarkets_bridge::usecases::dispatcher::Dispatcher;
use baymarkets_bridge::usecases::translator::RequestTranslator;

/// Environment variable naming the configuration file.
const ENV_CONFIG_PATH: &str = "BRIDGE_CONFIG";

/// Upper bound on draining in-flight requests at shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bridge.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.bridge.name,
        version = env!("CARGO_PKG_VERSION"),
        party = %config.bridge.party,
        venue = %config.venue.server_url,
        ledger = %config.ledger.stream_url,
        "Starting Baymarkets bridge"
    );

    // ── 3. Shutdown signal channel ──────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Venue client and translator ──────────────────────
    let venue = Arc::new(
        VenueHttpClient::new(&config.venue).context("Failed to create venue client")?,
    );
    let translator = Arc::new(RequestTranslator::new(venue, config.bridge.party.clone()));

    // ── 5. Ledger submitter and event stream ────────────────
    let submitter = Arc::new(
        HttpCommandSubmitter::new(&config.ledger, config.bridge.party.clone())
            .context("Failed to create ledger submitter")?,
    );

    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);

    let mut dispatcher = Dispatcher::new(translator, submitter);
    if config.metrics.enabled {
        dispatcher = dispatcher.with_metrics(Arc::clone(&metrics));
    }

    let mut stream = LedgerStream::new(&config.ledger, dispatcher.table().template_ids());
    if config.metrics.enabled {
        stream = stream.with_metrics(Arc::clone(&metrics));
    }
    let stream = Arc::new(stream);

    // ── 6. Metrics and health servers ───────────────────────
    let metrics_handle = if config.metrics.enabled {
        let metrics_shutdown = shutdown_tx.subscribe();
        let bind_address = config.metrics.bind_address.clone();
        let metrics_ref = Arc::clone(&metrics);
        Some(tokio::spawn(async move {
            if let Err(e) = metrics_ref.serve(bind_address, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    let health = Arc::new(HealthState::new(stream.connection_flag()));
    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    let health_shutdown = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    // ── 7. Ledger stream → dispatcher channel ───────────────
    let (events_tx, events_rx) = mpsc::channel(config.ledger.event_buffer);

    let stream_shutdown = shutdown_tx.subscribe();
    let stream_ref = Arc::clone(&stream);
    let stream_handle = tokio::spawn(async move {
        if let Err(e) = stream_ref.run(events_tx, stream_shutdown).await {
            error!(error = %e, "Ledger stream task failed");
        }
    });

    let dispatcher_shutdown = shutdown_tx.subscribe();
    let dispatcher_handle = tokio::spawn(async move {
        if let Err(e) = dispatcher.run(events_rx, dispatcher_shutdown).await {
            error!(error = %e, "Dispatcher failed");
        }
    });

    info!("All tasks spawned — bridge is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT");
    }
    info!("SIGINT received, initiating graceful shutdown");

    // ── Graceful shutdown (stop intake → drain → exit) ──────

    // 1. Readiness probe → 503
    health.begin_shutdown();

    // 2. Signal all tasks to stop
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // 3. Stop taking new events
    let _ = tokio::time::timeout(Duration::from_secs(5), stream_handle).await;

    // 4. Let in-flight requests finish (up to 30s)
    info!("Waiting for in-flight requests...");
    if tokio::time::timeout(DRAIN_TIMEOUT, dispatcher_handle).await.is_err() {
        error!("In-flight requests did not finish before the drain timeout");
    }

    // 5. Stop servers
    let _ = tokio::time::timeout(Duration::from_secs(5), health_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

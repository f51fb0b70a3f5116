//! Event Dispatcher - Template → Handler Routing and Task Fan-out
//!
//! Resolves each created event's template to a `RequestKind` through a
//! table built once at startup, runs the translator for it in its own
//! tokio task, and submits the resulting batch to the ledger.
//!
//! Tasks share nothing mutable apart from the set of contract ids in
//! flight. A request the ledger re-sends while its first task is still
//! running is skipped, so each request gets at most one venue call at a
//! time. A failure in one task is logged and counted and never reaches
//! any other task.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::translator::RequestTranslator;
use crate::adapters::metrics::prometheus::{MetricsRegistry, RequestOutcome};
use crate::domain::contracts::ContractId;
use crate::domain::request::{CreatedEvent, RequestKind};
use crate::ports::ledger::CommandSubmitter;
use crate::ports::venue::VenueClient;

/// Template-id → request-kind lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct HandlerTable {
  kinds: HashMap<&'static str, RequestKind>,
}

impl HandlerTable {
  /// Table covering all five request templates.
  pub fn new() -> Self {
    let kinds = RequestKind::ALL
      .iter()
      .map(|kind| (kind.template_id(), *kind))
      .collect();
    Self { kinds }
  }

  /// Resolve a template id to its kind.
  ///
  /// Accepts both `Module:Entity` and the package-qualified
  /// `<package-id>:Module:Entity` form the ledger reports.
  pub fn resolve(&self, template_id: &str) -> Option<RequestKind> {
    if let Some(kind) = self.kinds.get(template_id) {
      return Some(*kind);
    }
    let (_package, unqualified) = template_id.split_once(':')?;
    self.kinds.get(unqualified).copied()
  }

  /// Template ids the bridge subscribes to.
  pub fn template_ids(&self) -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = self.kinds.keys().copied().collect();
    ids.sort_unstable();
    ids
  }
}

impl Default for HandlerTable {
  fn default() -> Self {
    Self::new()
  }
}

/// What happened to a single created event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
  /// Template is not a request the bridge handles.
  Ignored,
  /// Same contract is already being handled; no venue call was made.
  AlreadyInFlight,
  /// Batch submitted; `commands` includes the archive.
  Submitted { kind: RequestKind, commands: usize, venue_error: bool },
  /// Translation failed; nothing was submitted.
  TranslationFailed { kind: RequestKind },
  /// Batch built but the ledger did not accept it.
  SubmissionFailed { kind: RequestKind },
}

/// Contract ids with a task currently running.
#[derive(Debug, Clone, Default)]
struct InFlight {
  ids: Arc<Mutex<HashSet<ContractId>>>,
}

impl InFlight {
  /// Claim `contract_id`, or `None` if it is already claimed.
  fn claim(&self, contract_id: &str) -> Option<Claim> {
    let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
    if !ids.insert(contract_id.to_string()) {
      return None;
    }
    Some(Claim {
      ids: Arc::clone(&self.ids),
      contract_id: contract_id.to_string(),
    })
  }

  fn len(&self) -> usize {
    self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

/// Releases its contract id on drop, including when the task panics.
#[derive(Debug)]
struct Claim {
  ids: Arc<Mutex<HashSet<ContractId>>>,
  contract_id: ContractId,
}

impl Drop for Claim {
  fn drop(&mut self) {
    self
      .ids
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&self.contract_id);
  }
}

/// Routes ledger events through the translator to the submitter.
pub struct Dispatcher<V: VenueClient, S: CommandSubmitter> {
  translator: Arc<RequestTranslator<V>>,
  submitter: Arc<S>,
  table: Arc<HandlerTable>,
  in_flight: InFlight,
  metrics: Option<Arc<MetricsRegistry>>,
}

impl<V: VenueClient, S: CommandSubmitter> Dispatcher<V, S> {
  /// Create a dispatcher with the standard handler table.
  pub fn new(translator: Arc<RequestTranslator<V>>, submitter: Arc<S>) -> Self {
    Self {
      translator,
      submitter,
      table: Arc::new(HandlerTable::new()),
      in_flight: InFlight::default(),
      metrics: None,
    }
  }

  /// Record outcomes and latency in `metrics`.
  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  pub fn table(&self) -> &HandlerTable {
    &self.table
  }

  /// Consume events until shutdown or until the channel closes.
  ///
  /// Each event runs in its own task. On exit, tasks already in flight
  /// are awaited so their batches are not lost.
  #[instrument(skip_all)]
  pub async fn run(
    &self,
    mut events: mpsc::Receiver<CreatedEvent>,
    mut shutdown_rx: broadcast::Receiver<()>,
  ) -> anyhow::Result<()> {
    let mut tasks: JoinSet<EventOutcome> = JoinSet::new();

    info!(templates = self.table.kinds.len(), "Dispatcher started");

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Dispatcher received shutdown signal");
          break;
        }
        Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
          log_joined(joined);
        }
        event = events.recv() => {
          match event {
            Some(event) => self.spawn(&mut tasks, event),
            None => {
              info!("Ledger event channel closed");
              break;
            }
          }
        }
      }
    }

    if !tasks.is_empty() {
      info!(in_flight = tasks.len(), "Waiting for in-flight requests");
    }
    while let Some(joined) = tasks.join_next().await {
      log_joined(joined);
    }

    info!("Dispatcher stopped cleanly");
    Ok(())
  }

  fn spawn(&self, tasks: &mut JoinSet<EventOutcome>, event: CreatedEvent) {
    let Some(claim) = self.in_flight.claim(&event.contract_id) else {
      skip_redelivery(&event, self.in_flight.len());
      return;
    };

    let translator = Arc::clone(&self.translator);
    let submitter = Arc::clone(&self.submitter);
    let metrics = self.metrics.clone();
    let table = Arc::clone(&self.table);

    tasks.spawn(async move {
      let _claim = claim;
      process(&table, &translator, submitter.as_ref(), metrics.as_deref(), &event).await
    });
  }

  /// Handle one event inline: resolve, translate, submit.
  ///
  /// Returns `AlreadyInFlight` without calling the venue when the same
  /// contract is being handled elsewhere.
  pub async fn handle(&self, event: &CreatedEvent) -> EventOutcome {
    let Some(_claim) = self.in_flight.claim(&event.contract_id) else {
      skip_redelivery(event, self.in_flight.len());
      return EventOutcome::AlreadyInFlight;
    };

    process(
      &self.table,
      &self.translator,
      self.submitter.as_ref(),
      self.metrics.as_deref(),
      event,
    )
    .await
  }
}

async fn process<V: VenueClient, S: CommandSubmitter>(
  table: &HandlerTable,
  translator: &RequestTranslator<V>,
  submitter: &S,
  metrics: Option<&MetricsRegistry>,
  event: &CreatedEvent,
) -> EventOutcome {
  let Some(kind) = table.resolve(&event.template_id) else {
    debug!(template = %event.template_id, "No handler for template");
    return EventOutcome::Ignored;
  };

  let started = Instant::now();
  let translated = translator.translate(kind, &event.contract_id).await;
  if let Some(m) = metrics {
    m.observe_latency(kind, started.elapsed().as_secs_f64());
  }

  let batch = match translated {
    Ok(batch) => batch,
    Err(e) => {
      error!(
        kind = %kind,
        cid = %event.contract_id,
        error = %e,
        "Request translation failed, request left active"
      );
      if let Some(m) = metrics {
        m.record_request(kind, RequestOutcome::Failed);
      }
      return EventOutcome::TranslationFailed { kind };
    }
  };

  if let Err(e) = submitter.submit(&batch).await {
    error!(
      kind = %kind,
      cid = %event.contract_id,
      error = %e,
      "Command batch submission failed"
    );
    if let Some(m) = metrics {
      m.submit_failures.inc();
      m.record_request(kind, RequestOutcome::Failed);
    }
    return EventOutcome::SubmissionFailed { kind };
  }

  let venue_error = batch.has_error_response();
  if venue_error {
    warn!(kind = %kind, cid = %event.contract_id, "Venue reported an error");
  }
  if let Some(m) = metrics {
    let outcome = if venue_error {
      RequestOutcome::VenueError
    } else {
      RequestOutcome::Success
    };
    m.record_request(kind, outcome);
  }

  info!(
    kind = %kind,
    cid = %event.contract_id,
    commands = batch.len(),
    "Command batch submitted"
  );

  EventOutcome::Submitted {
    kind,
    commands: batch.len(),
    venue_error,
  }
}

fn skip_redelivery(event: &CreatedEvent, in_flight: usize) {
  debug!(
    cid = %event.contract_id,
    template = %event.template_id,
    in_flight,
    "Request already in flight, skipping redelivery"
  );
}

fn log_joined(joined: Result<EventOutcome, tokio::task::JoinError>) {
  match joined {
    Ok(outcome) => debug!(?outcome, "Request task finished"),
    Err(e) => error!(error = %e, "Request task panicked or was cancelled"),
  }
}

//! Producer-facing facade.
//!
//! Every `fire_*` operation builds an immutable [`CoreEvent`] on the calling
//! thread, queues it on a worker and returns. Producers never wait for the
//! sink and never see an error: a rejected submission is logged and counted
//! in [`StatsSnapshot::submission_failures`].
//!
//! The one exception is [`EventDispatcher::fire_bitcoin_network_changed`],
//! which posts on the calling thread before returning.

use super::error::{StartError, SubmitError};
use super::gate::DebounceGate;
use super::stats::{DispatchStats, StatsSnapshot};
use super::worker::{Job, Shared, WorkerHandle, spawn_worker};
use crate::config::{ConfigStore, DebounceConfig, DispatchConfig};
use crate::events::{CoreEvent, EventKind, EventSink};
use compact_str::CompactString;
use rust_decimal::Decimal;
use satchel_sdk::objects::{
    BitcoinNetworkSummary, BitcoinSent, ChangePasswordResult, ExchangeSummary, ExportPerformed,
    HistoryEntry, SecuritySummary, ShutdownType, TransactionCreation, TransactionSeen, WalletId,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{info, trace, warn};

/// Name of the general worker pool; lanes are `core-events-0`, `core-events-1`, ...
pub const GENERAL_POOL: &str = "core-events";

/// Name of the transaction-seen worker.
pub const TX_SEEN_POOL: &str = "tx-seen";

/// Entry point for publishing core events.
///
/// Owns its worker threads and debounce gate. Create one per process at
/// startup and share it by cloning (clones are cheap handles to the same
/// workers). Call [`shutdown`](Self::shutdown) to drain and stop the workers;
/// dropping the last handle signals them to stop without waiting.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    shared: Arc<Shared>,
    lanes: Vec<WorkerHandle>,
    tx_seen: WorkerHandle,
    shutdown_tx: watch::Sender<bool>,
    closed: AtomicBool,
}

impl EventDispatcher {
    /// Start the worker threads and return the facade.
    ///
    /// The debounce settings are validated here; later changes go through
    /// [`debounce_config`](Self::debounce_config).
    pub fn new(config: DispatchConfig, sink: Arc<dyn EventSink>) -> Result<Self, StartError> {
        let DispatchConfig {
            pool_size,
            queue_capacity,
            debounce,
        } = config;
        if pool_size == 0 {
            return Err(StartError::EmptyPool);
        }
        if queue_capacity == 0 {
            return Err(StartError::EmptyQueue);
        }
        debounce.validate()?;

        let shared = Arc::new(Shared {
            sink,
            gate: DebounceGate::new(),
            stats: DispatchStats::default(),
            debounce: ConfigStore::new(debounce),
        });
        let (shutdown_tx, _) = watch::channel(false);

        // If a later worker fails to start, dropping `shutdown_tx` on the
        // error path stops the ones already running.
        let lanes = (0..pool_size)
            .map(|i| {
                spawn_worker(
                    GENERAL_POOL,
                    format!("{GENERAL_POOL}-{i}"),
                    queue_capacity,
                    None,
                    shared.clone(),
                    shutdown_tx.subscribe(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tx_seen = spawn_worker(
            TX_SEEN_POOL,
            TX_SEEN_POOL.to_string(),
            queue_capacity,
            Some(debounce),
            shared.clone(),
            shutdown_tx.subscribe(),
        )?;

        info!(pool_size, queue_capacity, "Event dispatcher started");

        Ok(Self {
            inner: Arc::new(DispatcherInner {
                shared,
                lanes,
                tx_seen,
                shutdown_tx,
                closed: AtomicBool::new(false),
            }),
        })
    }

    // -- Facade ---------------------------------------------------------

    /// Broadcast a new "exchange rate changed" event.
    ///
    /// `rate` is in `currency` against one bitcoin. `rate_provider` is absent
    /// when the source is unknown.
    pub fn fire_exchange_rate_changed(
        &self,
        rate: Decimal,
        currency: impl Into<CompactString>,
        rate_provider: Option<CompactString>,
        expires: OffsetDateTime,
    ) {
        self.submit(CoreEvent::ExchangeRateChanged {
            rate,
            currency: currency.into(),
            rate_provider,
            expires,
        });
    }

    pub fn fire_exchange_status_changed(&self, summary: ExchangeSummary) {
        self.submit(CoreEvent::ExchangeStatusChanged { summary });
    }

    pub fn fire_transaction_created(&self, creation: TransactionCreation) {
        self.submit(CoreEvent::TransactionCreated { creation });
    }

    pub fn fire_bitcoin_sent(&self, sent: BitcoinSent) {
        self.submit(CoreEvent::BitcoinSent { sent });
    }

    pub fn fire_change_password_result(&self, result: ChangePasswordResult) {
        self.submit(CoreEvent::ChangePasswordResult { result });
    }

    /// Broadcast a raw "transaction seen" event.
    ///
    /// Every call is posted on the `tx-seen` worker. In addition, at most one
    /// [`CoreEvent::SlowTransactionSeen`] is posted per debounce window, one
    /// window after the first raw event that found the gate idle.
    pub fn fire_transaction_seen(&self, seen: TransactionSeen) {
        let event = CoreEvent::TransactionSeen { seen };
        self.enqueue(
            &self.inner.tx_seen,
            EventKind::TransactionSeen,
            Job::DeliverAndConsolidate(event),
        );
    }

    /// Broadcast a "Bitcoin network changed" event on the calling thread.
    ///
    /// The event has reached the sink when this returns. Sink failures are
    /// still contained and logged.
    pub fn fire_bitcoin_network_changed(&self, summary: BitcoinNetworkSummary) {
        if summary.percent > 0 {
            trace!(percent = summary.percent, "Firing 'Bitcoin network changed' event");
        } else {
            trace!("Firing 'Bitcoin network changed' event");
        }
        self.inner
            .shared
            .deliver(CoreEvent::BitcoinNetworkChanged { summary });
    }

    pub fn fire_backup_wallet_loaded(&self, wallet_id: WalletId, backup_file: impl Into<PathBuf>) {
        self.submit(CoreEvent::BackupWalletLoaded {
            wallet_id,
            backup_file: backup_file.into(),
        });
    }

    pub fn fire_security_alert(&self, summary: SecuritySummary) {
        self.submit(CoreEvent::SecurityAlert { summary });
    }

    pub fn fire_history_changed(&self, entry: HistoryEntry) {
        self.submit(CoreEvent::HistoryChanged { entry });
    }

    /// Broadcast a "shutdown" event.
    ///
    /// Typically used for soft shutdowns; a hard shutdown should also call
    /// [`shutdown`](Self::shutdown) directly.
    pub fn fire_shutdown(&self, shutdown_type: ShutdownType) {
        self.submit(CoreEvent::ShutdownRequested { shutdown_type });
    }

    pub fn fire_configuration_changed(&self) {
        self.submit(CoreEvent::ConfigurationChanged);
    }

    pub fn fire_export_performed(&self, export: ExportPerformed) {
        self.submit(CoreEvent::ExportPerformed { export });
    }

    // -- Lifecycle ------------------------------------------------------

    /// Stop accepting events, drain the queues and join the workers.
    ///
    /// A pending consolidated post is cancelled. Idempotent. Blocks until
    /// the workers have finished their queues, so call it from a thread that
    /// may block (e.g. via `spawn_blocking` in async code).
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Shutting down event dispatcher");
        self.inner.shutdown_tx.send_replace(true);

        for worker in self.inner.lanes.iter().chain(std::iter::once(&self.inner.tx_seen)) {
            worker.join();
        }
        info!("Event dispatcher shutdown complete");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.shared.stats.snapshot()
    }

    /// Debounce settings, shared with the `tx-seen` worker.
    ///
    /// An update that fails [`DebounceConfig::validate`] is logged and
    /// ignored; the worker keeps the settings it had.
    pub fn debounce_config(&self) -> ConfigStore<DebounceConfig> {
        self.inner.shared.debounce.clone()
    }

    pub fn pool_size(&self) -> usize {
        self.inner.lanes.len()
    }

    /// Whether a consolidated transaction-seen post is currently pending.
    pub fn is_debounce_armed(&self) -> bool {
        self.inner.shared.gate.is_armed()
    }

    // -- Internals ------------------------------------------------------

    /// Lane for a kind. A kind always maps to the same lane, which keeps a
    /// single producer's events of that kind in order.
    fn lane_for(&self, kind: EventKind) -> &WorkerHandle {
        &self.inner.lanes[kind.index() % self.inner.lanes.len()]
    }

    fn submit(&self, event: CoreEvent) {
        let kind = event.kind();
        self.enqueue(self.lane_for(kind), kind, Job::Deliver(event));
    }

    fn enqueue(&self, worker: &WorkerHandle, kind: EventKind, job: Job) {
        let result = if self.is_shut_down() {
            Err(SubmitError::Closed {
                pool: worker.pool(),
            })
        } else {
            worker.submit(job)
        };

        match result {
            Ok(()) => self.inner.shared.stats.record_submitted(),
            Err(e) => {
                self.inner.shared.stats.record_submission_failure();
                warn!(%kind, error = %e, "Failed to submit event");
            }
        }
    }
}

impl Drop for DispatcherInner {
    fn drop(&mut self) {
        // Workers drain and exit on their own; nothing to join here.
        self.shutdown_tx.send_replace(true);
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("pool_size", &self.inner.lanes.len())
            .field("closed", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

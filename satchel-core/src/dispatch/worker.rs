//! Worker threads.
//!
//! A worker is one OS thread driving a current-thread tokio runtime. It pulls
//! [`Job`]s from a bounded queue in FIFO order and posts them to the sink.
//! The runtime's timer is what delays consolidated posts, so a pending
//! window never parks the thread.
//!
//! On shutdown the queue is closed and drained; timers still pending when
//! the runtime is dropped are cancelled.

use super::error::{DeliveryError, StartError, SubmitError};
use super::gate::{ArmOutcome, DebounceGate, GateState};
use super::stats::DispatchStats;
use crate::config::{ConfigStore, DebounceConfig};
use crate::events::{CoreEvent, EventSink};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle as TimerHandle;
use tracing::{debug, error, info, trace, warn};

/// State shared by every worker of one dispatcher.
pub(crate) struct Shared {
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) gate: DebounceGate,
    pub(crate) stats: DispatchStats,
    pub(crate) debounce: ConfigStore<DebounceConfig>,
}

impl Shared {
    /// Post one event to the sink, containing any failure.
    pub(crate) fn deliver(&self, event: CoreEvent) {
        let kind = event.kind();
        match self.try_deliver(event) {
            Ok(()) => self.stats.record_delivered(),
            Err(e) => {
                self.stats.record_delivery_failure();
                error!(%kind, error = %e, "Failed to deliver event");
            }
        }
    }

    fn try_deliver(&self, event: CoreEvent) -> Result<(), DeliveryError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.sink.post(event))) {
            Ok(result) => result.map_err(DeliveryError::from),
            Err(payload) => Err(DeliveryError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Body of the delayed task scheduled when the gate armed.
    ///
    /// Posts only while `generation` still owns the gate.
    fn fire_consolidated(&self, generation: u64) {
        if !self.gate.holds(generation) {
            debug!(generation, "Debounce window was replaced before it fired");
            return;
        }
        trace!(generation, "Firing 'slow transaction seen' event");
        self.deliver(CoreEvent::SlowTransactionSeen);
        self.stats.record_consolidated();
        self.gate.disarm(generation);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A unit of work queued on a worker.
#[derive(Debug)]
pub(crate) enum Job {
    /// Post the event.
    Deliver(CoreEvent),
    /// Post a raw transaction-seen event, then run the consolidation step.
    DeliverAndConsolidate(CoreEvent),
}

/// Submission side of a running worker.
pub(crate) struct WorkerHandle {
    pool: &'static str,
    name: String,
    tx: mpsc::Sender<Job>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerHandle {
    /// Queue a job without waiting.
    pub(crate) fn submit(&self, job: Job) -> Result<(), SubmitError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::Saturated { pool: self.pool },
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed { pool: self.pool },
        })
    }

    pub(crate) fn pool(&self) -> &'static str {
        self.pool
    }

    /// Wait for the worker thread to finish.
    ///
    /// Does nothing when called from the worker's own thread, which happens
    /// when a sink shuts the dispatcher down from inside `post`.
    pub(crate) fn join(&self) {
        let mut slot = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(thread) = slot.take() else {
            return;
        };
        if thread.thread().id() == std::thread::current().id() {
            debug!(worker = %self.name, "Shutdown requested from the worker itself, not joining");
            return;
        }
        drop(slot);
        if thread.join().is_err() {
            error!(worker = %self.name, "Worker thread terminated by panic");
        }
    }
}

/// Start a worker thread.
///
/// `debounce` is set only for the transaction-seen worker, the one that owns
/// debounce timers; it holds the validated settings to start with.
pub(crate) fn spawn_worker(
    pool: &'static str,
    name: String,
    capacity: usize,
    debounce: Option<DebounceConfig>,
    shared: Arc<Shared>,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<WorkerHandle, StartError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|source| StartError::Runtime {
            name: name.clone(),
            source,
        })?;

    let (tx, rx) = mpsc::channel(capacity);
    let worker = Worker {
        name: name.clone(),
        debounce,
        pending: None,
        shared,
        rx,
        shutdown_rx,
    };

    let thread = std::thread::Builder::new()
        .name(name.clone())
        .spawn(move || runtime.block_on(worker.run()))
        .map_err(|source| StartError::Spawn {
            name: name.clone(),
            source,
        })?;

    Ok(WorkerHandle {
        pool,
        name,
        tx,
        thread: Mutex::new(Some(thread)),
    })
}

struct Worker {
    name: String,
    /// Debounce settings in effect; only validated values are stored.
    debounce: Option<DebounceConfig>,
    /// Timer of the most recently armed window.
    pending: Option<TimerHandle<()>>,
    shared: Arc<Shared>,
    rx: mpsc::Receiver<Job>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Worker {
    async fn run(mut self) {
        debug!(worker = %self.name, "Worker started");
        let mut config_watcher = self.shared.debounce.subscribe();

        loop {
            tokio::select! {
                biased;

                // Shutdown has highest priority; a dropped dispatcher counts too.
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        debug!(worker = %self.name, "Worker received shutdown signal");
                        break;
                    }
                }

                Ok(()) = config_watcher.changed(), if self.debounce.is_some() => {
                    self.reload_debounce().await;
                }

                job = self.rx.recv() => match job {
                    Some(job) => self.run_job(job),
                    None => {
                        debug!(worker = %self.name, "Job queue closed");
                        break;
                    }
                }
            }
        }

        // Drain what was accepted before the queue closed.
        self.rx.close();
        let mut drained = 0usize;
        while let Some(job) = self.rx.recv().await {
            self.run_job(job);
            drained += 1;
        }

        if self.debounce.is_some() {
            if let GateState::Armed { generation, .. } = self.shared.gate.reset() {
                warn!(
                    worker = %self.name,
                    generation,
                    "Cancelled pending 'slow transaction seen' event"
                );
            }
        }

        debug!(worker = %self.name, drained, "Worker shutdown complete");
    }

    async fn reload_debounce(&mut self) {
        let config = self.shared.debounce.get().await;
        match config.validate() {
            Ok(()) => {
                self.debounce = Some(config);
                info!(
                    worker = %self.name,
                    window_ms = config.window.as_millis() as u64,
                    armed_ttl_ms = config.armed_ttl.as_millis() as u64,
                    "Debounce settings updated, applying from the next window"
                );
            }
            Err(e) => {
                error!(
                    worker = %self.name,
                    error = %e,
                    "Rejected debounce settings, keeping the previous ones"
                );
            }
        }
    }

    fn run_job(&mut self, job: Job) {
        match job {
            Job::Deliver(event) => {
                log_firing(&event);
                self.shared.deliver(event);
            }
            Job::DeliverAndConsolidate(event) => {
                log_firing(&event);
                self.shared.deliver(event);
                self.consolidate();
            }
        }
    }

    /// Arm the gate and schedule one consolidated post, unless one is pending.
    fn consolidate(&mut self) {
        let Some(config) = self.debounce else {
            return;
        };
        let now = Instant::now();

        let generation = match self.shared.gate.try_arm(now, config.armed_ttl) {
            ArmOutcome::AlreadyArmed => return,
            ArmOutcome::Armed { generation } => generation,
            ArmOutcome::Rearmed {
                generation,
                stale_for,
            } => {
                self.shared.stats.record_stale_rearm();
                let stale_for_ms = stale_for.as_millis() as u64;
                // A timer that has not run yet was starved by a slow sink.
                match self.pending.take() {
                    Some(timer) if !timer.is_finished() => {
                        timer.abort();
                        warn!(
                            worker = %self.name,
                            generation,
                            stale_for_ms,
                            "Debounce window overdue, re-arming"
                        );
                    }
                    _ => error!(
                        worker = %self.name,
                        generation,
                        stale_for_ms,
                        "Debounce gate was armed with no pending post, re-arming"
                    ),
                }
                generation
            }
        };

        let Some(deadline) = window_deadline(now, config.window) else {
            self.shared.gate.disarm(generation);
            error!(
                worker = %self.name,
                generation,
                window_ms = config.window.as_millis() as u64,
                "Could not schedule 'slow transaction seen' event, gate reset"
            );
            return;
        };

        let shared = self.shared.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            shared.fire_consolidated(generation);
        }));
    }
}

/// When a window armed at `now` closes, if that is representable.
fn window_deadline(now: Instant, window: Duration) -> Option<tokio::time::Instant> {
    now.checked_add(window).map(tokio::time::Instant::from_std)
}

fn log_firing(event: &CoreEvent) {
    match event {
        CoreEvent::ShutdownRequested { shutdown_type } => {
            info!(%shutdown_type, "Firing 'shutdown' event");
        }
        CoreEvent::ExchangeRateChanged { .. } => {
            debug!(?event, "Firing 'exchange rate changed' event");
        }
        other => trace!(kind = %other.kind(), "Firing event"),
    }
}

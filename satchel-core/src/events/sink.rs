//! The consumer side of the dispatcher.
//!
//! An [`EventSink`] is the one place finished events go. The dispatcher treats
//! it as opaque: it calls [`post`](EventSink::post) from worker threads (and
//! from the producer thread for network progress) and only looks at the
//! result to log and count failures.

use super::types::CoreEvent;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

/// Default capacity of a [`BroadcastSink`].
///
/// Slow subscribers that fall further behind than this lose the oldest events.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Errors a sink may report while accepting an event.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer has gone away.
    #[error("sink is closed")]
    Closed,

    /// The consumer is not keeping up.
    #[error("sink is full")]
    Full,

    /// Any other consumer-side failure.
    #[error("sink rejected event: {0}")]
    Rejected(String),
}

/// Thread-safe, fire-and-forget event consumer.
///
/// Implementations must not block for long: a slow `post` only delays the
/// worker that calls it, but it does delay every later event on that worker.
pub trait EventSink: Send + Sync + 'static {
    fn post(&self, event: CoreEvent) -> Result<(), SinkError>;
}

impl<F> EventSink for F
where
    F: Fn(CoreEvent) -> Result<(), SinkError> + Send + Sync + 'static,
{
    fn post(&self, event: CoreEvent) -> Result<(), SinkError> {
        self(event)
    }
}

/// In-process event bus backed by a tokio broadcast channel.
///
/// Every subscriber sees every event posted after it subscribed.
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<CoreEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventSink for BroadcastSink {
    fn post(&self, event: CoreEvent) -> Result<(), SinkError> {
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            // Nobody listening yet is fine.
            trace!(kind = %event.kind(), "No subscribers on event bus, event dropped");
        }
        Ok(())
    }
}

/// Sink that forwards into a bounded mpsc channel without waiting.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<CoreEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<CoreEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<CoreEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn post(&self, event: CoreEvent) -> Result<(), SinkError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

use crate::config::DebounceConfigError;
use crate::events::SinkError;
use thiserror::Error;

/// A task could not be queued on a worker.
///
/// Never returned to producers; the dispatcher logs and counts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{pool} queue is full")]
    Saturated { pool: &'static str },

    #[error("{pool} has been shut down")]
    Closed { pool: &'static str },
}

/// The sink failed while a worker was delivering an event.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("sink panicked: {0}")]
    Panicked(String),
}

/// The dispatcher could not be started.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("pool size must be at least 1")]
    EmptyPool,

    #[error("queue capacity must be at least 1")]
    EmptyQueue,

    #[error("invalid debounce settings: {0}")]
    InvalidDebounce(#[from] DebounceConfigError),

    #[error("failed to build runtime for worker {name}: {source}")]
    Runtime {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn worker thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

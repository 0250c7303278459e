//! Core events and the sink they are delivered to.
//!
//! Every state change a producer reports becomes a [`CoreEvent`]. Events are
//! immutable once built; the dispatcher moves them onto a worker and hands
//! them to the single [`EventSink`] of the application.
//!
//! # Event Flow
//!
//! 1. Producer calls a `fire_*` operation on the dispatcher
//! 2. The dispatcher queues the event on the lane for its kind
//!    (transaction-seen goes to the dedicated debounce worker)
//! 3. The worker posts the event to the sink
//! 4. For transaction-seen only, the worker arms the debounce gate and later
//!    posts one `SlowTransactionSeen` for the whole burst

pub mod sink;
pub mod types;

pub use sink::{BroadcastSink, ChannelSink, EventSink, SinkError, DEFAULT_BUS_CAPACITY};
pub use types::{CoreEvent, EventKind};

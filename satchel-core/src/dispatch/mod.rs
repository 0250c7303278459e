//! Event dispatch and debounce engine.
//!
//! - [`EventDispatcher`]: the facade producers call, one `fire_*` per kind
//! - general lanes (`core-events-N`): worker threads for every kind except
//!   transaction-seen, each kind pinned to one lane
//! - the `tx-seen` worker: single thread that posts raw transaction-seen
//!   events and owns the consolidation timer
//! - [`DebounceGate`]: guarantees at most one pending consolidated post

mod dispatcher;
mod error;
mod gate;
mod stats;
mod worker;

pub use dispatcher::{EventDispatcher, GENERAL_POOL, TX_SEEN_POOL};
pub use error::{DeliveryError, StartError, SubmitError};
pub use gate::{ArmOutcome, DebounceGate, GateState};
pub use stats::{DispatchStats, StatsSnapshot};

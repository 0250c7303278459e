//! Event dispatch and debounce engine of the Satchel wallet.
//!
//! Producers publish state changes through an [`EventDispatcher`]; worker
//! threads deliver them to a single [`EventSink`] so that slow consumers
//! never block producers, and bursts of transaction-seen events collapse
//! into one consolidated notification per window.
//!
//! [`EventDispatcher`]: dispatch::EventDispatcher
//! [`EventSink`]: events::EventSink

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod dispatch;
pub mod events;

pub use config::{DebounceConfig, DebounceConfigError, DispatchConfig};
pub use dispatch::{EventDispatcher, StatsSnapshot};
pub use events::{CoreEvent, EventKind, EventSink, SinkError};

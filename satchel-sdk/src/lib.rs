//! Payload vocabulary for the Satchel wallet event stream.
//!
//! These are the value objects carried by core events. They are shared by
//! producers (the wallet services), the dispatch engine in `satchel-core`
//! and consumers of the event stream.

#![forbid(unsafe_code)]

pub mod objects;

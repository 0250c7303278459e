#![allow(dead_code)]

use satchel_core::events::{CoreEvent, EventKind, EventSink, SinkError};
use satchel_sdk::objects::{Confidence, Satoshis, TransactionSeen};
use std::sync::Mutex;
use std::thread::ThreadId;
use std::time::{Duration, Instant};

/// An event as the sink saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub at: Instant,
    pub thread: ThreadId,
    pub thread_name: Option<String>,
    pub event: CoreEvent,
}

/// Sink that keeps everything it is given, optionally taking its time.
#[derive(Default)]
pub struct RecordingSink {
    delay: Duration,
    /// When set, only events of this kind are delayed.
    slow_kind: Option<EventKind>,
    events: Mutex<Vec<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every `post` takes `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// A sink that takes `delay` for events of `kind` only.
    pub fn slow_for(kind: EventKind, delay: Duration) -> Self {
        Self {
            delay,
            slow_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Recorded> {
        self.events()
            .into_iter()
            .filter(|r| r.event.kind() == kind)
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).len()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Poll until `done` holds or `timeout` passes. Returns whether it held.
    pub fn wait_for(&self, timeout: Duration, done: impl Fn(&RecordingSink) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if done(self) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        done(self)
    }
}

impl EventSink for RecordingSink {
    fn post(&self, event: CoreEvent) -> Result<(), SinkError> {
        if !self.delay.is_zero() && self.slow_kind.is_none_or(|kind| kind == event.kind()) {
            std::thread::sleep(self.delay);
        }
        let current = std::thread::current();
        self.events.lock().unwrap().push(Recorded {
            at: Instant::now(),
            thread: current.id(),
            thread_name: current.name().map(str::to_string),
            event,
        });
        Ok(())
    }
}

pub fn seen(n: u64) -> TransactionSeen {
    TransactionSeen {
        txid: format!("{n:064x}").into(),
        depth: 0,
        confidence: Confidence::Pending,
        coinbase: false,
        amount: Satoshis(10_000 + n),
    }
}

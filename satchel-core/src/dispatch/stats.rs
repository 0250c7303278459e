//! Delivery counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the dispatcher and its workers.
#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    submission_failures: AtomicU64,
    delivered: AtomicU64,
    delivery_failures: AtomicU64,
    consolidated: AtomicU64,
    stale_rearms: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events accepted onto a worker queue.
    pub submitted: u64,
    /// Events rejected because a queue was full or shut down.
    pub submission_failures: u64,
    /// Events the sink accepted, raw and consolidated.
    pub delivered: u64,
    /// Events the sink rejected or panicked on.
    pub delivery_failures: u64,
    /// Consolidated transaction-seen events fired.
    pub consolidated: u64,
    /// Times the gate watchdog replaced a stuck window.
    pub stale_rearms: u64,
}

impl DispatchStats {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_submission_failure(&self) {
        self.submission_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_consolidated(&self) {
        self.consolidated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_rearm(&self) {
        self.stale_rearms.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            submission_failures: self.submission_failures.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            consolidated: self.consolidated.load(Ordering::Relaxed),
            stale_rearms: self.stale_rearms.load(Ordering::Relaxed),
        }
    }
}

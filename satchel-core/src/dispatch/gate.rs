//! Debounce gate for transaction-seen consolidation.
//!
//! The gate is either idle or armed. Arming is a single check-and-set under
//! one mutex, so any number of concurrent callers produce exactly one armed
//! window. The lock is never held while anything is posted to the sink.
//!
//! Each arming gets a new generation number. Only the scheduled task that
//! armed a given generation can disarm it, so a stuck window that was
//! replaced by the TTL watchdog cannot clear its successor.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Armed { since: Instant, generation: u64 },
}

/// Result of [`DebounceGate::try_arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// The gate was idle and is now armed; the caller must schedule the
    /// consolidated post for `generation`.
    Armed { generation: u64 },
    /// A consolidated post is already pending; nothing to do.
    AlreadyArmed,
    /// The gate had been armed for longer than the TTL with nothing firing.
    /// It now belongs to `generation` and the caller must schedule again.
    Rearmed { generation: u64, stale_for: Duration },
}

impl ArmOutcome {
    /// Generation the caller has to schedule, if any.
    pub fn scheduled_generation(self) -> Option<u64> {
        match self {
            ArmOutcome::Armed { generation } | ArmOutcome::Rearmed { generation, .. } => {
                Some(generation)
            }
            ArmOutcome::AlreadyArmed => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: GateState,
    next_generation: u64,
}

#[derive(Debug)]
pub struct DebounceGate {
    inner: Mutex<Inner>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: GateState::Idle,
                next_generation: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The critical sections cannot panic halfway, so a poisoned lock
        // still holds a consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the gate unless a window is already pending.
    ///
    /// A window armed for longer than `armed_ttl` is treated as lost and
    /// replaced.
    pub fn try_arm(&self, now: Instant, armed_ttl: Duration) -> ArmOutcome {
        let mut inner = self.lock();
        match inner.state {
            GateState::Idle => {
                let generation = inner.arm(now);
                ArmOutcome::Armed { generation }
            }
            GateState::Armed { since, .. } => {
                let age = now.saturating_duration_since(since);
                if age > armed_ttl {
                    let generation = inner.arm(now);
                    ArmOutcome::Rearmed {
                        generation,
                        stale_for: age,
                    }
                } else {
                    ArmOutcome::AlreadyArmed
                }
            }
        }
    }

    /// Whether `generation` is the window currently armed.
    pub fn holds(&self, generation: u64) -> bool {
        matches!(self.lock().state, GateState::Armed { generation: g, .. } if g == generation)
    }

    /// Return to idle if `generation` is still the armed window.
    ///
    /// Returns `false` when the gate was idle or owned by another generation.
    pub fn disarm(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        match inner.state {
            GateState::Armed { generation: g, .. } if g == generation => {
                inner.state = GateState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Force the gate back to idle, returning the previous state.
    pub fn reset(&self) -> GateState {
        std::mem::replace(&mut self.lock().state, GateState::Idle)
    }

    pub fn state(&self) -> GateState {
        self.lock().state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state(), GateState::Armed { .. })
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn arm(&mut self, now: Instant) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.state = GateState::Armed {
            since: now,
            generation,
        };
        generation
    }
}

//! Tunables for the dispatch engine.
//!
//! [`DispatchConfig`] is fixed for the lifetime of an
//! [`EventDispatcher`](crate::dispatch::EventDispatcher). The debounce part is
//! kept in a [`ConfigStore`] so the window can be changed while running; a
//! new value applies from the next window that arms.

mod config_store;

pub use config_store::{ConfigStore, ConfigWatcher};

use std::time::Duration;
use thiserror::Error;

/// Default number of general-event lanes.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Default capacity of each worker queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default consolidation window for transaction-seen bursts.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Default upper bound on how long the gate may stay armed.
pub const DEFAULT_ARMED_TTL: Duration = Duration::from_secs(10);

/// Longest accepted consolidation window.
pub const MAX_DEBOUNCE_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Consolidation settings for the transaction-seen pool.
///
/// The consolidated event fires one `window` after the first raw event of a
/// burst (leading edge); later events in the same window do not move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Delay between arming the gate and posting the consolidated event.
    pub window: Duration,
    /// An armed gate older than this is considered stuck and is re-armed.
    pub armed_ttl: Duration,
}

/// A [`DebounceConfig`] that the engine refuses to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DebounceConfigError {
    #[error("debounce window must be non-zero")]
    ZeroWindow,

    #[error("debounce window {window:?} exceeds the {max:?} limit")]
    WindowTooLong { window: Duration, max: Duration },

    #[error("armed TTL {armed_ttl:?} must be longer than the debounce window {window:?}")]
    TtlNotAfterWindow { armed_ttl: Duration, window: Duration },
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_DEBOUNCE_WINDOW,
            armed_ttl: DEFAULT_ARMED_TTL,
        }
    }
}

impl DebounceConfig {
    /// Settings for `window`, with a TTL of at least twice the window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            armed_ttl: DEFAULT_ARMED_TTL.max(window.saturating_mul(2)),
        }
    }

    pub fn validate(&self) -> Result<(), DebounceConfigError> {
        if self.window.is_zero() {
            return Err(DebounceConfigError::ZeroWindow);
        }
        if self.window > MAX_DEBOUNCE_WINDOW {
            return Err(DebounceConfigError::WindowTooLong {
                window: self.window,
                max: MAX_DEBOUNCE_WINDOW,
            });
        }
        // A TTL inside the window would re-arm a healthy pending window.
        if self.armed_ttl <= self.window {
            return Err(DebounceConfigError::TtlNotAfterWindow {
                armed_ttl: self.armed_ttl,
                window: self.window,
            });
        }
        Ok(())
    }
}

/// Configuration for an [`EventDispatcher`](crate::dispatch::EventDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Number of general-event worker threads.
    pub pool_size: usize,
    /// Bounded queue length per worker; a full queue rejects submissions.
    pub queue_capacity: usize,
    pub debounce: DebounceConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            debounce: DebounceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.debounce.window, Duration::from_secs(1));
        assert_eq!(config.debounce.validate(), Ok(()));
    }

    #[test]
    fn test_ttl_follows_long_windows() {
        let short = DebounceConfig::with_window(Duration::from_millis(100));
        assert_eq!(short.armed_ttl, DEFAULT_ARMED_TTL);

        let long = DebounceConfig::with_window(Duration::from_secs(30));
        assert_eq!(long.armed_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_with_window_saturates() {
        let huge = DebounceConfig::with_window(Duration::MAX);
        assert_eq!(huge.armed_ttl, Duration::MAX);
        assert_eq!(
            huge.validate(),
            Err(DebounceConfigError::WindowTooLong {
                window: Duration::MAX,
                max: MAX_DEBOUNCE_WINDOW,
            })
        );
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        let zero = DebounceConfig::with_window(Duration::ZERO);
        assert_eq!(zero.validate(), Err(DebounceConfigError::ZeroWindow));

        let short_ttl = DebounceConfig {
            window: Duration::from_millis(500),
            armed_ttl: Duration::from_millis(500),
        };
        assert!(matches!(
            short_ttl.validate(),
            Err(DebounceConfigError::TtlNotAfterWindow { .. })
        ));

        assert_eq!(DebounceConfig::with_window(MAX_DEBOUNCE_WINDOW).validate(), Ok(()));
    }
}

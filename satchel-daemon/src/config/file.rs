//! TOML file configuration structures.
//!
//! These structs directly map to the `satchel.toml` file format. Every
//! field has a default, so an empty file is a valid configuration.

use satchel_core::config::{DEFAULT_DEBOUNCE_WINDOW, DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub dispatch: DispatchSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Worker pools and debounce settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSection {
    /// Number of general-event worker threads.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Bounded queue length per worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Transaction-seen consolidation window in milliseconds.
    #[serde(default = "default_debounce_window_ms")]
    pub debounce_window_ms: u64,
    /// How long the debounce gate may stay armed before it is considered
    /// stuck, in milliseconds. Derived from the window when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armed_ttl_ms: Option<u64>,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            queue_capacity: default_queue_capacity(),
            debounce_window_ms: default_debounce_window_ms(),
            armed_ttl_ms: None,
        }
    }
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_debounce_window_ms() -> u64 {
    DEFAULT_DEBOUNCE_WINDOW.as_millis() as u64
}

/// How delivered events are written to stdout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    /// Pretty-print each event instead of one JSON object per line.
    #[serde(default)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[dispatch]
pool_size = 4
queue_capacity = 64
debounce_window_ms = 250
armed_ttl_ms = 5000

[output]
pretty = true
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.dispatch.pool_size, 4);
        assert_eq!(config.dispatch.queue_capacity, 64);
        assert_eq!(config.dispatch.debounce_window_ms, 250);
        assert_eq!(config.dispatch.armed_ttl_ms, Some(5000));
        assert!(config.output.pretty);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.dispatch.pool_size, 10);
        assert_eq!(config.dispatch.queue_capacity, 1024);
        assert_eq!(config.dispatch.debounce_window_ms, 1000);
        assert_eq!(config.dispatch.armed_ttl_ms, None);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str("[dispatch]\npool_size = 2\n").unwrap();
        assert_eq!(config.dispatch.pool_size, 2);
        assert_eq!(config.dispatch.debounce_window_ms, 1000);
    }
}

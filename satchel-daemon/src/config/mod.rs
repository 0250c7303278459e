//! Configuration module for satchel-daemon.
//!
//! Handles loading configuration from a TOML file and applying CLI
//! overrides on top of it.

pub mod file;

use crate::config::file::FileConfig;
use satchel_core::config::{DebounceConfig, DispatchConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./satchel.toml";

/// The file to load for `path`.
///
/// Only the default path may be missing, in which case defaults are used.
pub fn config_file(path: &Path) -> Option<&Path> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        None
    } else {
        Some(path)
    }
}

/// Values given on the command line, which win over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub pool_size: Option<usize>,
    pub debounce_window_ms: Option<u64>,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub dispatch: DispatchConfig,
    pub pretty_output: bool,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader. Without a path only defaults and
    /// overrides are used.
    pub fn new(config_path: Option<impl AsRef<Path>>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            overrides,
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if any
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match &self.config_path {
            Some(path) => {
                let config_content = std::fs::read_to_string(path)?;
                toml::from_str(&config_content)?
            }
            None => FileConfig::default(),
        };

        if let Some(pool_size) = self.overrides.pool_size {
            file_config.dispatch.pool_size = pool_size;
        }
        if let Some(window_ms) = self.overrides.debounce_window_ms {
            file_config.dispatch.debounce_window_ms = window_ms;
        }

        let loaded = build_loaded_config(file_config);
        self.validate(&loaded)?;

        Ok(loaded)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &LoadedConfig) -> Result<(), ConfigError> {
        let dispatch = &config.dispatch;
        if dispatch.pool_size == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.pool_size must be at least 1".to_string(),
            ));
        }
        if dispatch.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.queue_capacity must be at least 1".to_string(),
            ));
        }
        dispatch
            .debounce
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("dispatch: {e}")))
    }
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let dispatch = file_config.dispatch;
    LoadedConfig {
        dispatch: DispatchConfig {
            pool_size: dispatch.pool_size,
            queue_capacity: dispatch.queue_capacity,
            debounce: debounce_config(dispatch.debounce_window_ms, dispatch.armed_ttl_ms),
        },
        pretty_output: file_config.output.pretty,
    }
}

/// An explicit TTL is kept as given; otherwise it scales with the window.
fn debounce_config(window_ms: u64, armed_ttl_ms: Option<u64>) -> DebounceConfig {
    let window = Duration::from_millis(window_ms);
    match armed_ttl_ms {
        Some(ttl_ms) => DebounceConfig {
            window,
            armed_ttl: Duration::from_millis(ttl_ms),
        },
        None => DebounceConfig::with_window(window),
    }
}

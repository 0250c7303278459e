//! Satchel event relay daemon.
//!
//! Reads producer commands as JSON lines on stdin, publishes them through
//! the core event dispatcher and writes every delivered event as JSON to
//! stdout. Logs go to stderr.

mod commands;
mod config;
mod output;
mod shutdown;

use clap::Parser;
use commands::ProducerCommand;
use config::{ConfigLoader, DEFAULT_CONFIG_PATH, Overrides, config_file};
use output::JsonLinesSink;
use satchel_core::dispatch::EventDispatcher;
use satchel_sdk::objects::ShutdownType;
use shutdown::{shutdown_signal, spawn_config_reload_handler};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Satchel - wallet core event relay
#[derive(Parser, Debug)]
#[command(name = "satchel-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "SATCHEL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the number of general event workers
    #[arg(long)]
    pool_size: Option<usize>,

    /// Override the transaction-seen debounce window in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting satchel-daemon v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(
        config_file(&args.config),
        Overrides {
            pool_size: args.pool_size,
            debounce_window_ms: args.debounce_ms,
        },
    ));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    match config_loader.config_path() {
        Some(path) => tracing::info!("Configuration loaded from {:?}", path),
        None => tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_PATH),
    }

    let sink = JsonLinesSink::new(std::io::stdout(), loaded_config.pretty_output);
    let dispatcher = EventDispatcher::new(loaded_config.dispatch, Arc::new(sink))?;

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(dispatcher.clone(), config_loader)?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut signals_available = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            biased;

            result = &mut shutdown, if signals_available => match result {
                Ok(()) => break,
                Err(e) => {
                    // Keep relaying; end of input still shuts down.
                    tracing::error!("Failed to install signal handlers: {}", e);
                    signals_available = false;
                }
            },

            line = lines.next_line() => match line {
                Ok(Some(line)) => match ProducerCommand::parse(&line) {
                    Ok(Some(command)) => command.apply(&dispatcher),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed command"),
                },
                Ok(None) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    }

    dispatcher.fire_shutdown(ShutdownType::Soft);
    reload_notify.notify_one();

    // Joining the workers blocks until their queues are drained.
    let draining = dispatcher.clone();
    tokio::task::spawn_blocking(move || draining.shutdown()).await?;

    let stats = dispatcher.stats();
    tracing::info!(
        submitted = stats.submitted,
        delivered = stats.delivered,
        submission_failures = stats.submission_failures,
        delivery_failures = stats.delivery_failures,
        consolidated = stats.consolidated,
        "satchel-daemon shutdown complete"
    );

    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,satchel_core=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

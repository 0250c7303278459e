//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use satchel_core::dispatch::EventDispatcher;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

/// Completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
    Ok(())
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// Only the debounce settings can change at runtime; a different pool size
/// or queue capacity is reported and ignored until restart. A successful
/// reload is announced with a "configuration changed" event.
///
/// Returns a Notify that stops the handler.
pub fn spawn_config_reload_handler(
    dispatcher: EventDispatcher,
    config_loader: Arc<ConfigLoader>,
) -> std::io::Result<Arc<Notify>> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded_config) => {
                            let dispatch = loaded_config.dispatch;
                            if dispatch.pool_size != dispatcher.pool_size() {
                                tracing::warn!(
                                    current = dispatcher.pool_size(),
                                    configured = dispatch.pool_size,
                                    "Pool size changes take effect after restart"
                                );
                            }
                            dispatcher.debounce_config().update(dispatch.debounce).await;
                            dispatcher.fire_configuration_changed();

                            tracing::info!("Configuration reloaded successfully");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    Ok(shutdown_notify)
}

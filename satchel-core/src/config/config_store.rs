//! Generic config store with change notification.
//!
//! `ConfigStore<T>` wraps `Arc<RwLock<T>>` and provides a watch-based
//! notification mechanism so that consumers can react to config changes
//! without polling.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, RwLockReadGuard, watch};

/// A shared, versioned configuration store with change notification.
///
/// Wraps a value of type `T` behind `Arc<RwLock<T>>` and maintains an
/// incrementing version counter. Subscribers receive a [`ConfigWatcher`]
/// that can `await` the next change.
pub struct ConfigStore<T> {
    inner: Arc<ConfigStoreInner<T>>,
}

struct ConfigStoreInner<T> {
    data: RwLock<T>,
    version: AtomicU64,
    version_tx: watch::Sender<u64>,
}

/// Receives notifications when a [`ConfigStore`] is updated.
pub struct ConfigWatcher {
    version_rx: watch::Receiver<u64>,
}

// -- ConfigStore --------------------------------------------------------

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (version_tx, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(ConfigStoreInner {
                data: RwLock::new(initial),
                version: AtomicU64::new(0),
                version_tx,
            }),
        }
    }

    /// Replace the stored value and notify all watchers.
    pub async fn update(&self, value: T) {
        let mut guard = self.inner.data.write().await;
        *guard = value;
        let new_version = self.inner.version.fetch_add(1, Ordering::Relaxed) + 1;
        // Drop the write guard before notifying so subscribers can
        // immediately acquire a read lock.
        drop(guard);
        self.inner.version_tx.send_replace(new_version);
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.data.read().await
    }

    /// Copy out the current value.
    pub async fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.data.read().await.clone()
    }

    /// Number of updates applied since creation.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> ConfigWatcher {
        ConfigWatcher {
            version_rx: self.inner.version_tx.subscribe(),
        }
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// -- ConfigWatcher ------------------------------------------------------

impl ConfigWatcher {
    /// Wait until the config store is updated.
    ///
    /// Returns `Ok(())` when a new version is available, or `Err` if the
    /// [`ConfigStore`] has been dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.version_rx.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_update_notifies_watcher() {
        let store = ConfigStore::new(Duration::from_secs(1));
        let mut watcher = store.subscribe();

        store.update(Duration::from_millis(250)).await;

        assert!(watcher.changed().await.is_ok());
        assert_eq!(store.get().await, Duration::from_millis(250));
        assert_eq!(store.version(), 1);
    }

    #[tokio::test]
    async fn test_watcher_errors_once_store_dropped() {
        let store = ConfigStore::new(0u8);
        let mut watcher = store.subscribe();
        drop(store);
        assert!(watcher.changed().await.is_err());
    }
}

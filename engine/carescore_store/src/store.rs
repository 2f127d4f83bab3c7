//! Thread-safe holder of the published artifact snapshot

use crate::config::StoreConfig;
use crate::snapshot::{ArtifactSnapshot, StoreStatus};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Publishes one [`ArtifactSnapshot`] at a time.
///
/// Readers clone the current `Arc` and keep using it for as long as they
/// need; a reload builds the replacement without holding the read lock and
/// only takes the write lock for the pointer swap.
pub struct ArtifactStore {
    config: StoreConfig,
    current: RwLock<Arc<ArtifactSnapshot>>,
    reload_guard: Mutex<()>,
}

impl ArtifactStore {
    /// Load every artifact once and publish the result
    pub fn open(config: StoreConfig) -> Self {
        let snapshot = ArtifactSnapshot::load(&config);
        log::info!(
            "artifact store opened at {} ({} load errors)",
            config.project_root().display(),
            snapshot.errors.len()
        );
        Self::with_snapshot(config, snapshot)
    }

    /// Publish a prepared snapshot without touching the filesystem
    pub fn with_snapshot(config: StoreConfig, snapshot: ArtifactSnapshot) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(snapshot)),
            reload_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<ArtifactSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Re-load from the configured locations and swap the result in
    pub fn reload(&self) -> StoreStatus {
        let _reloading = self.reload_guard.lock();
        let fresh = Arc::new(ArtifactSnapshot::load(&self.config));
        let status = fresh.status(self.config.project_root());
        *self.current.write() = fresh;
        log::info!("artifacts reloaded ({} load errors)", status.errors.len());
        status
    }

    pub fn status(&self) -> StoreStatus {
        self.snapshot().status(self.config.project_root())
    }
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("config", &self.config)
            .field("current", &*self.current.read())
            .finish()
    }
}

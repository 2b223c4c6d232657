use crate::infrastructure::storage::local::TempFileStore;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Deletes job files some time after the request that produced them.
#[derive(Clone, Debug)]
pub struct CleanupScheduler {
    store: TempFileStore,
}

impl CleanupScheduler {
    pub fn new(store: TempFileStore) -> Self {
        Self { store }
    }

    /// Spawns a detached timer that deletes every path once `delay` has passed.
    ///
    /// Each deletion is independent; failures are logged and dropped. The
    /// returned handle may be ignored, the task runs to completion either way.
    pub fn schedule(&self, paths: Vec<PathBuf>, delay: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        debug!("🧹 Cleanup of {} file(s) scheduled in {:?}", paths.len(), delay);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            for path in paths {
                if let Err(e) = store.delete(&path).await {
                    warn!("Cleanup failed for {}: {}", path.display(), e);
                }
            }
        })
    }
}

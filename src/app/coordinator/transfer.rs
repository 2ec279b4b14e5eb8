//! Per-file transfer protocol
//!
//! Each listed object is handled independently: resume check, fetch into a
//! temp file, atomic rename, ledger update. Failures are retried with
//! exponential backoff and demote to a counted failure when the retry budget
//! is exhausted; a single file can never abort the batch.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::app::models::RemoteObject;
use crate::app::state::DownloadState;
use crate::app::store::ObjectStore;
use crate::constants::files::TEMP_FILE_SUFFIX;

use super::options::DownloadOptions;
use super::progress::TransferCounters;

/// Shared context for the transfer workers of one run
pub(super) struct TransferContext {
    pub store: Arc<dyn ObjectStore>,
    pub options: DownloadOptions,
    /// Normalized source prefix, stripped from keys to build local paths
    pub prefix: String,
    pub counters: TransferCounters,
    pub ledger: RwLock<DownloadState>,
}

impl TransferContext {
    /// Local destination for an object key
    ///
    /// The source prefix is stripped and the remainder joined onto the output
    /// directory component by component, normalizing separators for the local
    /// filesystem.
    pub fn destination_for(&self, key: &str) -> PathBuf {
        let relative = key.strip_prefix(&self.prefix).unwrap_or(key);
        let mut path = self.options.output_dir.clone();
        for component in relative.split('/').filter(|c| !c.is_empty()) {
            path.push(component);
        }
        path
    }

    /// Resume check: skip when the local file and the ledger both agree on size
    async fn is_already_downloaded(&self, object: &RemoteObject) -> bool {
        let dest = self.destination_for(&object.key);

        let on_disk_matches = match fs::metadata(&dest).await {
            Ok(meta) => meta.is_file() && meta.len() == object.size,
            Err(_) => false,
        };
        if !on_disk_matches {
            return false;
        }

        let ledger = self.ledger.read().await;
        ledger
            .get(&object.key)
            .map(|entry| entry.size == object.size)
            .unwrap_or(false)
    }

    /// Run the transfer protocol for one object
    pub async fn transfer(&self, object: RemoteObject) {
        if !self.options.force && self.is_already_downloaded(&object).await {
            debug!("Skipping already-downloaded {}", object.key);
            self.counters.record_skipped();
            return;
        }

        let dest = self.destination_for(&object.key);
        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!("Cannot create directory for {}: {}", object.key, e);
                self.counters.record_failed();
                return;
            }
        }

        let temp_path = dest.with_file_name(format!(
            "{}{}",
            dest.file_name().unwrap_or_default().to_string_lossy(),
            TEMP_FILE_SUFFIX
        ));

        let attempts = self.options.max_retries.max(1);
        for attempt in 0..attempts {
            match self.attempt_transfer(&object, &temp_path, &dest).await {
                Ok(()) => {
                    let mut ledger = self.ledger.write().await;
                    ledger.record(object.key.clone(), object.size, object.etag.clone());
                    drop(ledger);

                    self.counters.record_completed(object.size);
                    debug!("Downloaded {} ({} bytes)", object.key, object.size);
                    return;
                }
                Err(e) => {
                    // Never leave a partial temp file behind
                    let _ = fs::remove_file(&temp_path).await;

                    if attempt + 1 < attempts {
                        let delay = self.options.retry_base_delay * 2u32.saturating_pow(attempt);
                        debug!(
                            "Transfer of {} failed (attempt {}), retrying in {:?}: {}",
                            object.key,
                            attempt + 1,
                            delay,
                            e
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(
                            "Giving up on {} after {} attempts: {}",
                            object.key, attempts, e
                        );
                        self.counters.record_failed();
                    }
                }
            }
        }
    }

    /// One fetch attempt: temp file, then atomic rename onto the destination
    async fn attempt_transfer(
        &self,
        object: &RemoteObject,
        temp_path: &std::path::Path,
        dest: &std::path::Path,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.store.download_to(&object.key, temp_path).await?;
        fs::rename(temp_path, dest).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::store::MemoryStore;
    use std::time::Duration;
    use tempfile::TempDir;

    fn context(store: Arc<MemoryStore>, options: DownloadOptions) -> TransferContext {
        let prefix = options.normalized_prefix();
        TransferContext {
            store,
            options,
            prefix,
            counters: TransferCounters::default(),
            ledger: RwLock::new(DownloadState::default()),
        }
    }

    #[test]
    fn destination_strips_prefix_and_splits_components() {
        let dir = TempDir::new().unwrap();
        let options = DownloadOptions::new("d/2023_1", dir.path());
        let ctx = context(Arc::new(MemoryStore::new()), options);

        let dest = ctx.destination_for("d/2023_1/tiles/N50/tile_DEM.tif");
        assert_eq!(
            dest,
            dir.path().join("tiles").join("N50").join("tile_DEM.tif")
        );

        // Keys outside the prefix fall back to their own full path
        let dest = ctx.destination_for("other/file.tif");
        assert_eq!(dest, dir.path().join("other").join("file.tif"));
    }

    #[tokio::test]
    async fn transfer_writes_file_and_updates_ledger() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("d/tile_DEM.tif", b"elevation".to_vec());

        let ctx = context(store, DownloadOptions::new("d/", dir.path()));
        let object = RemoteObject::new("d/tile_DEM.tif", 9, "\"e\"");
        ctx.transfer(object).await;

        assert_eq!(ctx.counters.completed(), 1);
        assert_eq!(ctx.counters.bytes(), 9);
        let content = fs::read(dir.path().join("tile_DEM.tif")).await.unwrap();
        assert_eq!(content, b"elevation");
        assert!(ctx.ledger.read().await.get("d/tile_DEM.tif").is_some());
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("d/tile_DEM.tif", b"elevation".to_vec());
        store.fail_next("d/tile_DEM.tif", 2);

        let options = DownloadOptions::new("d/", dir.path())
            .with_max_retries(3)
            .with_retry_base_delay(Duration::from_millis(1));
        let ctx = context(store, options);

        ctx.transfer(RemoteObject::new("d/tile_DEM.tif", 9, "\"e\"")).await;
        assert_eq!(ctx.counters.completed(), 1);
        assert_eq!(ctx.counters.failed(), 0);
    }

    #[tokio::test]
    async fn exhausted_retries_count_as_failure() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("d/tile_DEM.tif", b"elevation".to_vec());
        store.fail_next("d/tile_DEM.tif", 10);

        let options = DownloadOptions::new("d/", dir.path())
            .with_max_retries(2)
            .with_retry_base_delay(Duration::from_millis(1));
        let ctx = context(store, options);

        ctx.transfer(RemoteObject::new("d/tile_DEM.tif", 9, "\"e\"")).await;
        assert_eq!(ctx.counters.completed(), 0);
        assert_eq!(ctx.counters.failed(), 1);
        // No temp file left behind
        assert!(!dir.path().join("tile_DEM.tif.tmp").exists());
    }

    #[tokio::test]
    async fn resume_skips_only_when_disk_and_ledger_agree() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("d/tile_DEM.tif", b"elevation".to_vec());

        let ctx = context(store.clone(), DownloadOptions::new("d/", dir.path()));
        let object = RemoteObject::new("d/tile_DEM.tif", 9, "\"e\"");

        // File on disk but no ledger entry: re-download
        fs::write(dir.path().join("tile_DEM.tif"), b"elevation")
            .await
            .unwrap();
        ctx.transfer(object.clone()).await;
        assert_eq!(ctx.counters.completed(), 1);

        // Now both agree: skip
        ctx.transfer(object.clone()).await;
        assert_eq!(ctx.counters.skipped(), 1);
        assert_eq!(store.download_count(), 1);
    }

    #[tokio::test]
    async fn force_bypasses_resume_check() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.put("d/tile_DEM.tif", b"elevation".to_vec());

        let options = DownloadOptions::new("d/", dir.path()).with_force(true);
        let ctx = context(store.clone(), options);
        let object = RemoteObject::new("d/tile_DEM.tif", 9, "\"e\"");

        ctx.transfer(object.clone()).await;
        ctx.transfer(object).await;

        assert_eq!(ctx.counters.completed(), 2);
        assert_eq!(ctx.counters.skipped(), 0);
        assert_eq!(store.download_count(), 2);
    }
}

//! Progress snapshots and run results
//!
//! Workers update four scalar counters via atomic increments; the progress
//! ticker reads them lossily without ever blocking a transfer. Both the
//! periodic snapshot and the final result are pure data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::app::listing::ListingStatus;

/// Shared transfer counters, updated by workers and sampled by the ticker
#[derive(Debug, Default)]
pub struct TransferCounters {
    completed_files: AtomicU64,
    skipped_files: AtomicU64,
    failed_files: AtomicU64,
    downloaded_bytes: AtomicU64,
}

impl TransferCounters {
    /// Record one completed file of the given size
    pub fn record_completed(&self, bytes: u64) {
        self.completed_files.fetch_add(1, Ordering::Relaxed);
        self.downloaded_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record one skipped file
    pub fn record_skipped(&self) {
        self.skipped_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed file
    pub fn record_failed(&self) {
        self.failed_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Completed file count
    pub fn completed(&self) -> u64 {
        self.completed_files.load(Ordering::Relaxed)
    }

    /// Skipped file count
    pub fn skipped(&self) -> u64 {
        self.skipped_files.load(Ordering::Relaxed)
    }

    /// Failed file count
    pub fn failed(&self) -> u64 {
        self.failed_files.load(Ordering::Relaxed)
    }

    /// Downloaded byte count
    pub fn bytes(&self) -> u64 {
        self.downloaded_bytes.load(Ordering::Relaxed)
    }
}

/// A point-in-time snapshot of a running download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Total files selected for this run
    pub total_files: u64,
    /// Total bytes of all selected files, known from listing
    pub total_bytes: u64,
    /// Files transferred so far
    pub completed_files: u64,
    /// Files skipped by the resume check
    pub skipped_files: u64,
    /// Files that exhausted their retry budget
    pub failed_files: u64,
    /// Bytes transferred so far
    pub downloaded_bytes: u64,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
}

impl DownloadProgress {
    /// Files handled so far, regardless of outcome
    pub fn handled_files(&self) -> u64 {
        self.completed_files + self.skipped_files + self.failed_files
    }
}

/// Final report of one download run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Total files selected by listing
    pub total_files: u64,
    /// Total bytes of all selected files
    pub total_bytes: u64,
    /// Files transferred
    pub completed_files: u64,
    /// Files skipped by the resume check
    pub skipped_files: u64,
    /// Files that exhausted their retry budget
    pub failed_files: u64,
    /// Bytes transferred
    pub downloaded_bytes: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Matched object keys; populated only for dry runs
    pub listed_keys: Vec<String>,
    /// Outcome of the listing phase
    pub listing_status: ListingStatus,
}

impl DownloadResult {
    /// An all-zero result for runs that stop before downloading
    pub fn empty(listing_status: ListingStatus, elapsed: Duration) -> Self {
        Self {
            total_files: 0,
            total_bytes: 0,
            completed_files: 0,
            skipped_files: 0,
            failed_files: 0,
            downloaded_bytes: 0,
            elapsed,
            dry_run: false,
            listed_keys: Vec::new(),
            listing_status,
        }
    }
}

/// Push-style observer receiving periodic progress snapshots
pub type ProgressObserver = Arc<dyn Fn(DownloadProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let counters = TransferCounters::default();
        counters.record_completed(100);
        counters.record_completed(50);
        counters.record_skipped();
        counters.record_failed();

        assert_eq!(counters.completed(), 2);
        assert_eq!(counters.skipped(), 1);
        assert_eq!(counters.failed(), 1);
        assert_eq!(counters.bytes(), 150);
    }

    #[test]
    fn progress_handled_files() {
        let progress = DownloadProgress {
            total_files: 10,
            total_bytes: 1000,
            completed_files: 3,
            skipped_files: 2,
            failed_files: 1,
            downloaded_bytes: 300,
            elapsed: Duration::from_secs(5),
        };
        assert_eq!(progress.handled_files(), 6);
    }
}

//! Terminal progress display for download runs
//!
//! A single indicatif bar fed by the coordinator's periodic
//! `DownloadProgress` snapshots. The bar tracks bytes; file counts ride along
//! in the message segment.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app::coordinator::{DownloadProgress, ProgressObserver};

/// Progress bar wrapper that renders coordinator snapshots
pub struct DownloadProgressBar {
    bar: ProgressBar,
}

impl DownloadProgressBar {
    /// Create a bar; totals are taken from the first snapshot
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    /// Observer handing snapshots to this bar
    pub fn observer(&self) -> ProgressObserver {
        let bar = self.bar.clone();
        Arc::new(move |progress: DownloadProgress| {
            bar.set_length(progress.total_bytes);
            bar.set_position(progress.downloaded_bytes);
            bar.set_message(format!(
                "{}/{} files, {} skipped, {} failed",
                progress.completed_files,
                progress.total_files,
                progress.skipped_files,
                progress.failed_files
            ));
        })
    }

    /// Clear the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for DownloadProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinner shown while the listing phase scans the key space
pub struct ListingSpinner {
    bar: ProgressBar,
}

impl ListingSpinner {
    /// Create and start the spinner
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Listing objects...");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    /// Observer receiving (pages, scanned) updates from the listing phase
    pub fn observer(&self) -> crate::app::listing::ListingObserver {
        let bar = self.bar.clone();
        Arc::new(move |pages: u64, scanned: u64| {
            bar.set_message(format!("Listing objects... {scanned} keys ({pages} pages)"));
        })
    }

    /// Clear the spinner from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ListingSpinner {
    fn default() -> Self {
        Self::new()
    }
}

//! Download orchestration
//!
//! The coordinator drives one run end to end:
//! Init → Listing → (DryRunReport | EmptyReport | Downloading) → Finalizing
//! → Done. The listing phase is sequential; the download phase fans out over
//! a bounded set of concurrent per-file transfers. A ticker samples shared
//! counters roughly once per second and pushes snapshots to an observer
//! without ever blocking a worker.
//!
//! Cancellation is a single broadcast signal scoped to the whole run. When it
//! fires, in-flight transfers are dropped promptly, the resume ledger is
//! still persisted best-effort, and the run surfaces
//! [`FetchError::Cancelled`](crate::errors::FetchError::Cancelled) instead of
//! a result.
//!
//! Two simultaneous runs against the same output directory race on the state
//! file; that is not guarded against.

pub mod options;
pub mod progress;
pub mod signals;

mod transfer;

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::app::listing::{ListingObserver, ListingStatus, ListingStrategy};
use crate::app::state::DownloadState;
use crate::app::store::ObjectStore;
use crate::constants::progress::TICK_INTERVAL;
use crate::errors::{FetchError, FetchResult};

pub use options::DownloadOptions;
pub use progress::{DownloadProgress, DownloadResult, ProgressObserver, TransferCounters};
pub use signals::{create_shutdown_channel, spawn_signal_handler};

use transfer::TransferContext;

/// Orchestrates one download run against an object store
pub struct Coordinator {
    store: Arc<dyn ObjectStore>,
    options: DownloadOptions,
    progress_observer: Option<ProgressObserver>,
    listing_observer: Option<ListingObserver>,
}

impl Coordinator {
    /// Create a coordinator for a store and a frozen set of options
    pub fn new(store: Arc<dyn ObjectStore>, options: DownloadOptions) -> Self {
        Self {
            store,
            options,
            progress_observer: None,
            listing_observer: None,
        }
    }

    /// Attach an observer for periodic download progress snapshots
    pub fn with_progress_observer(mut self, observer: ProgressObserver) -> Self {
        self.progress_observer = Some(observer);
        self
    }

    /// Attach an observer for listing page progress
    pub fn with_listing_observer(mut self, observer: ListingObserver) -> Self {
        self.listing_observer = Some(observer);
        self
    }

    /// Run the download end to end
    ///
    /// The shutdown receiver cancels the run; cancellation surfaces as
    /// [`FetchError::Cancelled`], never as counted failures.
    pub async fn run(
        &self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> FetchResult<DownloadResult> {
        let start = Instant::now();

        // Init: output directory and resume ledger
        tokio::fs::create_dir_all(&self.options.output_dir).await?;
        let state_path = self.options.state_file_path();
        let ledger = DownloadState::load_or_default(&state_path).await;
        if !ledger.is_empty() {
            info!("Loaded resume ledger with {} entries", ledger.len());
        }

        // Listing
        let prefix = self.options.normalized_prefix();
        let mut strategy = ListingStrategy::new(&self.options.masks, self.options.bbox.as_ref());
        if let Some(observer) = &self.listing_observer {
            strategy = strategy.with_observer(observer.clone());
        }
        let listing = strategy.list(self.store.as_ref(), &prefix).await?;

        let total_files = listing.objects.len() as u64;
        let total_bytes = listing.total_bytes();

        if self.options.dry_run {
            info!(
                "Dry run: {} files, {} bytes would be downloaded",
                total_files, total_bytes
            );
            return Ok(DownloadResult {
                total_files,
                total_bytes,
                dry_run: true,
                listed_keys: listing.objects.into_iter().map(|o| o.key).collect(),
                listing_status: listing.status,
                elapsed: start.elapsed(),
                ..DownloadResult::empty(ListingStatus::Matched, start.elapsed())
            });
        }

        if listing.objects.is_empty() {
            info!("Nothing to download: {}", listing.status.describe());
            return Ok(DownloadResult::empty(listing.status, start.elapsed()));
        }

        // Downloading: bounded fan-out plus a lossy progress ticker
        let context = Arc::new(TransferContext {
            store: self.store.clone(),
            options: self.options.clone(),
            prefix,
            counters: TransferCounters::default(),
            ledger: RwLock::new(ledger),
        });

        let ticker = self.spawn_ticker(context.clone(), total_files, total_bytes, start);

        let downloads = {
            let context = context.clone();
            async move {
                let mut transfers = futures::stream::iter(listing.objects)
                    .map(|object| {
                        let context = context.clone();
                        async move { context.transfer(object).await }
                    })
                    .buffer_unordered(context.options.parallelism);
                while transfers.next().await.is_some() {}
            }
        };
        tokio::pin!(downloads);

        let cancelled = tokio::select! {
            _ = shutdown_rx.recv() => true,
            _ = &mut downloads => false,
        };

        // Finalizing: stop the ticker and persist the ledger best-effort,
        // also on cancellation so a later run resumes cleanly
        if let Some(ticker) = ticker {
            ticker.abort();
        }
        let ledger = context.ledger.read().await;
        if let Err(e) = ledger.save(&state_path).await {
            warn!("Could not save state file: {}", e);
        }
        drop(ledger);

        if cancelled {
            info!("Run cancelled after {:?}", start.elapsed());
            return Err(FetchError::Cancelled);
        }

        let result = DownloadResult {
            total_files,
            total_bytes,
            completed_files: context.counters.completed(),
            skipped_files: context.counters.skipped(),
            failed_files: context.counters.failed(),
            downloaded_bytes: context.counters.bytes(),
            elapsed: start.elapsed(),
            dry_run: false,
            listed_keys: Vec::new(),
            listing_status: listing.status,
        };

        info!(
            "Run complete: {} downloaded, {} skipped, {} failed, {} bytes in {:?}",
            result.completed_files,
            result.skipped_files,
            result.failed_files,
            result.downloaded_bytes,
            result.elapsed
        );

        Ok(result)
    }

    /// Spawn the once-per-second progress sampler, when an observer is attached
    fn spawn_ticker(
        &self,
        context: Arc<TransferContext>,
        total_files: u64,
        total_bytes: u64,
        start: Instant,
    ) -> Option<tokio::task::JoinHandle<()>> {
        let observer = self.progress_observer.clone()?;

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                observer(DownloadProgress {
                    total_files,
                    total_bytes,
                    completed_files: context.counters.completed(),
                    skipped_files: context.counters.skipped(),
                    failed_files: context.counters.failed(),
                    downloaded_bytes: context.counters.bytes(),
                    elapsed: start.elapsed(),
                });
            }
        }))
    }
}

//! Object listing strategies
//!
//! Two mutually exclusive scan algorithms, chosen by the presence of a
//! bounding box. Both paginate the full key space under the dataset prefix;
//! the bbox-optimized scan only reduces CPU filtering cost by running the
//! cheap suffix check before the coordinate parse. There is no server-side
//! geographic filtering to lean on, so network listing volume is identical
//! either way.

use std::sync::Arc;

use tracing::{debug, info};

use crate::app::bbox::BoundingBox;
use crate::app::models::{MaskSelection, RemoteObject};
use crate::app::store::ObjectStore;
use crate::app::tiles;
use crate::constants::progress::LISTING_SIGNAL_PAGES;
use crate::errors::StoreResult;

/// Why a listing produced no candidates, when it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    /// At least one object matched all filters
    Matched,
    /// Nothing exists under the prefix at all; likely a bad prefix
    NoObjects,
    /// Objects exist but none matched the mask selection
    NoMaskMatches,
    /// Objects matched the mask selection but all fell outside the bbox
    NoBboxMatches,
}

impl ListingStatus {
    /// Human-readable explanation for the CLI summary
    pub fn describe(&self) -> &'static str {
        match self {
            ListingStatus::Matched => "objects matched the requested filters",
            ListingStatus::NoObjects => {
                "no objects found under the prefix; check the dataset name and version"
            }
            ListingStatus::NoMaskMatches => {
                "objects exist but none matched the mask selection; try other mask types"
            }
            ListingStatus::NoBboxMatches => {
                "objects matched the mask selection but none fell inside the bounding box"
            }
        }
    }
}

/// Result of one listing run
#[derive(Debug, Clone)]
pub struct ListingOutcome {
    /// Candidate objects in listing order
    pub objects: Vec<RemoteObject>,
    /// Total objects enumerated, before filtering
    pub scanned: u64,
    /// Why the candidate set is (or is not) empty
    pub status: ListingStatus,
}

impl ListingOutcome {
    /// Sum of candidate object sizes in bytes
    pub fn total_bytes(&self) -> u64 {
        self.objects.iter().map(|o| o.size).sum()
    }
}

/// Observer invoked every few pages while a listing is in flight
///
/// Receives the page count and the number of keys scanned so far. Purely for
/// UX; correctness does not depend on it.
pub type ListingObserver = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Filter configuration for one listing run
pub struct ListingStrategy<'a> {
    masks: &'a MaskSelection,
    bbox: Option<&'a BoundingBox>,
    observer: Option<ListingObserver>,
}

impl<'a> ListingStrategy<'a> {
    /// Create a strategy for the given filters
    ///
    /// A present bounding box selects the bbox-optimized scan; otherwise the
    /// full scan filters by mask suffix alone.
    pub fn new(masks: &'a MaskSelection, bbox: Option<&'a BoundingBox>) -> Self {
        Self {
            masks,
            bbox,
            observer: None,
        }
    }

    /// Attach a page-progress observer
    pub fn with_observer(mut self, observer: ListingObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Enumerate all objects under `prefix` and apply the configured filters
    pub async fn list(
        &self,
        store: &dyn ObjectStore,
        prefix: &str,
    ) -> StoreResult<ListingOutcome> {
        let mut objects = Vec::new();
        let mut scanned: u64 = 0;
        let mut mask_matched: u64 = 0;
        let mut pages: u64 = 0;
        let mut token = None;

        loop {
            let page = store.list_page(prefix, None, token).await?;
            pages += 1;
            scanned += page.objects.len() as u64;

            for object in page.objects {
                // Suffix check first; it is cheap and eliminates most
                // auxiliary files before any coordinate parsing happens.
                if !tiles::matches_mask_filter(&object.key, self.masks) {
                    continue;
                }
                mask_matched += 1;

                if let Some(bbox) = self.bbox {
                    if !tiles::is_in_bounding_box(&object.key, bbox) {
                        continue;
                    }
                }

                objects.push(object);
            }

            if pages % LISTING_SIGNAL_PAGES == 0 {
                debug!("Listing progress: {} pages, {} keys scanned", pages, scanned);
                if let Some(observer) = &self.observer {
                    observer(pages, scanned);
                }
            }

            match page.next_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        let status = if !objects.is_empty() {
            ListingStatus::Matched
        } else if scanned == 0 {
            ListingStatus::NoObjects
        } else if mask_matched == 0 {
            ListingStatus::NoMaskMatches
        } else {
            ListingStatus::NoBboxMatches
        };

        info!(
            "Listing complete: {} scanned, {} matched over {} pages",
            scanned,
            objects.len(),
            pages
        );

        Ok(ListingOutcome {
            objects,
            scanned,
            status,
        })
    }
}

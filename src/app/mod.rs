//! Core application logic for DEM Fetcher
//!
//! This module contains the domain components: geographic filtering, tile
//! coordinate parsing, the object-store access layer, dataset discovery, the
//! listing strategies, the persisted resume ledger, and the download
//! coordinator that ties them together.

pub mod bbox;
pub mod coordinator;
pub mod datasets;
pub mod discovery;
pub mod listing;
pub mod models;
pub mod state;
pub mod store;
pub mod tiles;

// Re-export main public API
pub use bbox::BoundingBox;
pub use coordinator::{
    create_shutdown_channel, spawn_signal_handler, Coordinator, DownloadOptions, DownloadProgress,
    DownloadResult, ProgressObserver,
};
pub use datasets::{DatasetInfo, DatasetVersion, DiscoveredDataset};
pub use listing::{ListingOutcome, ListingStatus, ListingStrategy};
pub use models::{MaskSelection, MaskType, RemoteObject};
pub use state::{DownloadState, FileState};
pub use store::{MemoryStore, ObjectStore, S3Store, StoreConfig};
pub use tiles::{is_in_bounding_box, matches_mask_filter, parse_coordinates, TileCoordinate};

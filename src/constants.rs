//! Application constants for DEM Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for object-store credentials
pub mod env {
    /// Environment variable name for the access key
    pub const ACCESS_KEY: &str = "DEM_FETCHER_ACCESS_KEY";

    /// Environment variable name for the secret key
    pub const SECRET_KEY: &str = "DEM_FETCHER_SECRET_KEY";
}

/// Object-store connection defaults
pub mod store {
    /// Default S3-compatible endpoint for the public Copernicus DEM mirror
    pub const DEFAULT_ENDPOINT: &str = "https://prism-dem-open.copernicus.eu";

    /// Default bucket holding the DEM datasets
    pub const DEFAULT_BUCKET: &str = "copernicus-dem";

    /// Region string used when the endpoint does not care about regions
    pub const DEFAULT_REGION: &str = "eu-central-1";
}

/// Concurrency and retry limits
pub mod limits {
    /// Minimum number of concurrent transfers
    pub const MIN_PARALLEL: usize = 1;

    /// Maximum number of concurrent transfers
    pub const MAX_PARALLEL: usize = 32;

    /// Default number of concurrent transfers
    pub const DEFAULT_PARALLEL: usize = 4;

    /// Maximum retry attempts per file
    pub const MAX_RETRIES: u32 = 10;

    /// Default retry attempts per file
    pub const DEFAULT_RETRIES: u32 = 3;
}

/// Tile geometry constants
pub mod tiles {
    /// Width of one elevation tile in degrees of longitude
    pub const TILE_WIDTH_DEGREES: f64 = 1.0;

    /// Height of one elevation tile in degrees of latitude
    pub const TILE_HEIGHT_DEGREES: f64 = 1.0;

    /// Equatorial length of one degree in kilometers
    pub const KM_PER_DEGREE: f64 = 111.32;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic download operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Default name of the resume ledger inside the output directory
    pub const DEFAULT_STATE_FILE: &str = "download-state.json";
}

/// Progress reporting intervals
pub mod progress {
    use super::Duration;

    /// How often the coordinator emits a progress snapshot while downloading
    pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

    /// Emit a listing progress signal every this many pages
    pub const LISTING_SIGNAL_PAGES: u64 = 10;
}

// Re-export commonly used constants for convenience
pub use files::{DEFAULT_STATE_FILE, TEMP_FILE_SUFFIX};
pub use limits::{DEFAULT_PARALLEL, DEFAULT_RETRIES, MAX_PARALLEL, MAX_RETRIES};
pub use store::{DEFAULT_BUCKET, DEFAULT_ENDPOINT, DEFAULT_REGION};

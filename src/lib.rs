//! DEM Fetcher Library
//!
//! A Rust library for bulk-downloading Copernicus DEM elevation tiles from
//! S3-compatible object stores. Provides geographic bounding-box filtering,
//! mask-layer selection, concurrent resumable transfers, and a persisted
//! resume ledger that makes repeated runs idempotent.

pub mod app;
pub mod cli;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

//! Command-line interface for DEM Fetcher
//!
//! Argument parsing, command dispatch, and terminal progress rendering.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, ConnectionArgs, DatasetsArgs, DownloadArgs, GlobalArgs};
pub use commands::{handle_datasets, handle_download};
pub use progress::{DownloadProgressBar, ListingSpinner};

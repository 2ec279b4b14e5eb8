//! Command-line argument parsing for DEM Fetcher
//!
//! Defines the CLI structure using clap derive macros: a `download` command
//! for bulk tile transfers and a `datasets` command for catalog and version
//! discovery.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::{limits, store};

/// DEM Fetcher - Download Copernicus DEM elevation tiles
#[derive(Parser, Debug)]
#[command(
    name = "dem_fetcher",
    version,
    about = "Download Copernicus DEM elevation tiles from S3-compatible stores",
    long_about = "A tool for bulk-downloading Copernicus DEM elevation tiles.
Supports geographic bounding-box filtering, mask-layer selection, concurrent
resumable transfers, and idempotent re-runs via a persisted state file."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download elevation tiles
    Download(DownloadArgs),

    /// List known datasets and their versions
    Datasets(DatasetsArgs),
}

/// Connection arguments shared by all store-facing commands
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// S3-compatible endpoint URL
    #[arg(long, default_value = store::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bucket name
    #[arg(long, default_value = store::DEFAULT_BUCKET)]
    pub bucket: String,

    /// Region string passed to the store
    #[arg(long, default_value = store::DEFAULT_REGION)]
    pub region: String,

    /// Access key (falls back to DEM_FETCHER_ACCESS_KEY)
    #[arg(long)]
    pub access_key: Option<String>,

    /// Secret key (falls back to DEM_FETCHER_SECRET_KEY)
    #[arg(long)]
    pub secret_key: Option<String>,
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Connection options
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Dataset name from the catalog, or a raw prefix containing '/'
    #[arg(short, long)]
    pub dataset: String,

    /// Dataset version folder (e.g. "2023_1"); latest discovered if omitted
    #[arg(long)]
    pub dataset_version: Option<String>,

    /// Bounding box filter: min_lon,min_lat,max_lon,max_lat
    #[arg(short, long)]
    pub bbox: Option<String>,

    /// Comma-separated mask layers to download (DEM always included)
    #[arg(short, long, default_value = "DEM")]
    pub masks: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Number of concurrent transfers (1-32)
    #[arg(short = 'w', long, default_value_t = limits::DEFAULT_PARALLEL)]
    pub workers: usize,

    /// Retry attempts per file (0-10)
    #[arg(long, default_value_t = limits::DEFAULT_RETRIES)]
    pub retries: u32,

    /// Name of the state file inside the output directory
    #[arg(long)]
    pub state_file: Option<String>,

    /// Force re-download of existing files
    #[arg(short, long)]
    pub force: bool,

    /// Dry run - list what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the datasets command
#[derive(Args, Debug, Clone)]
pub struct DatasetsArgs {
    /// Connection options
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Show the discovered versions of this dataset
    #[arg(long)]
    pub versions: Option<String>,

    /// Skip remote discovery and print the static catalog only
    #[arg(long)]
    pub catalog_only: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl DownloadArgs {
    /// Validate argument combinations the type system cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.dataset.trim().is_empty() {
            return Err("Dataset name or prefix must not be empty".to_string());
        }

        if self.workers == 0 {
            return Err("Number of workers must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> DownloadArgs {
        DownloadArgs {
            connection: ConnectionArgs {
                endpoint: store::DEFAULT_ENDPOINT.to_string(),
                bucket: store::DEFAULT_BUCKET.to_string(),
                region: store::DEFAULT_REGION.to_string(),
                access_key: None,
                secret_key: None,
            },
            dataset: "COP-DEM_GLO-30-DGED".to_string(),
            dataset_version: None,
            bbox: None,
            masks: "DEM".to_string(),
            output: PathBuf::from("."),
            workers: 4,
            retries: 3,
            state_file: None,
            force: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_download_args_validation() {
        let args = base_args();
        assert!(args.validate().is_ok());

        let mut bad = base_args();
        bad.workers = 0;
        assert!(bad.validate().is_err());

        let mut bad = base_args();
        bad.dataset = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let cli_quiet = Cli {
            global: GlobalArgs {
                verbose: false,
                very_verbose: false,
                quiet: true,
            },
            command: Commands::Download(base_args()),
        };

        let cli_verbose = Cli {
            global: GlobalArgs {
                verbose: true,
                very_verbose: false,
                quiet: false,
            },
            command: Commands::Download(base_args()),
        };

        assert_eq!(cli_quiet.log_level(), tracing::Level::ERROR);
        assert_eq!(cli_verbose.log_level(), tracing::Level::INFO);
    }
}

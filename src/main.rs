//! DEM Fetcher CLI application
//!
//! Command-line interface for bulk-downloading Copernicus DEM elevation tiles
//! from S3-compatible object stores. Features bounding-box and mask-layer
//! filtering, concurrent transfers, and resumable runs.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dem_fetcher::cli::{handle_datasets, handle_download, Cli, Commands};
use dem_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("DEM Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args).await
        }
        Commands::Datasets(args) => {
            info!("Executing datasets command");
            handle_datasets(args).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("dem_fetcher={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}

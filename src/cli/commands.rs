//! Command handlers for DEM Fetcher CLI
//!
//! Coordinates between parsed arguments and the core application: store
//! construction, dataset/version resolution, the download coordinator, and
//! terminal reporting.

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{
    create_shutdown_channel, datasets, discovery, spawn_signal_handler, BoundingBox, Coordinator,
    DownloadOptions, DownloadResult, ListingStatus, MaskSelection, ObjectStore, S3Store,
    StoreConfig,
};
use crate::cli::progress::{DownloadProgressBar, ListingSpinner};
use crate::cli::{ConnectionArgs, DatasetsArgs, DownloadArgs};
use crate::constants::env as env_keys;
use crate::errors::{AppError, FetchError, Result};

/// Handle the download command
pub async fn handle_download(args: DownloadArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let masks = MaskSelection::parse(&args.masks).map_err(AppError::generic)?;

    let bbox = match &args.bbox {
        Some(raw) => {
            let bbox = BoundingBox::parse(raw)?;
            if let Some(note) = bbox.normalization_warning() {
                warn!("Bounding box was adjusted: {}", note);
                println!("Note: bounding box adjusted ({note})");
            }
            Some(bbox)
        }
        None => None,
    };

    let store: Arc<dyn ObjectStore> = Arc::new(connect_store(&args.connection).await);
    let prefix = resolve_prefix(store.as_ref(), &args.dataset, args.dataset_version.as_deref())
        .await?;
    info!("Downloading from prefix '{}'", prefix);

    let mut options = DownloadOptions::new(prefix, args.output.clone())
        .with_parallelism(args.workers)
        .with_max_retries(args.retries)
        .with_force(args.force)
        .with_dry_run(args.dry_run)
        .with_masks(masks);
    if let Some(bbox) = bbox {
        options = options.with_bbox(bbox);
    }
    if let Some(state_file) = &args.state_file {
        options = options.with_state_file(state_file.clone());
    }

    let spinner = ListingSpinner::new();
    let bar = DownloadProgressBar::new();
    let coordinator = Coordinator::new(store, options)
        .with_listing_observer(spinner.observer())
        .with_progress_observer(bar.observer());

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let signal_task = spawn_signal_handler(shutdown_tx);

    let outcome = coordinator.run(shutdown_rx).await;
    signal_task.abort();
    spinner.finish();
    bar.finish();

    match outcome {
        Ok(result) => {
            print_result(&result);
            Ok(())
        }
        Err(FetchError::Cancelled) => {
            println!("Download cancelled. Completed files are kept; re-run to resume.");
            Err(AppError::Fetch(FetchError::Cancelled))
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle the datasets command
pub async fn handle_datasets(args: DatasetsArgs) -> Result<()> {
    if let Some(dataset) = &args.versions {
        let store = connect_store(&args.connection).await;
        let prefix = dataset_prefix(dataset)?;
        let versions = discovery::discover_versions(&store, &prefix).await?;

        println!("Versions of {dataset} (most recent first):");
        for version in versions {
            println!("  {:<12} {}", version.to_string(), version.full_prefix);
        }
        return Ok(());
    }

    println!("Known datasets:");
    for info in datasets::catalog() {
        println!(
            "  {:<22} {:>3}m {:<9} {:<5} {}  {}",
            info.name,
            info.resolution_m,
            info.coverage.to_string(),
            info.format.to_string(),
            if info.is_public { "public " } else { "private" },
            info.description
        );
    }

    if args.catalog_only {
        return Ok(());
    }

    let store = connect_store(&args.connection).await;
    match discovery::discover_datasets(&store, "").await {
        Ok(discovered) => {
            println!("\nDiscovered in the store:");
            for dataset in discovered {
                let tag = if dataset.info.is_some() {
                    "known"
                } else {
                    "uncatalogued"
                };
                println!("  {:<30} {}", dataset.name, tag);
            }
        }
        Err(e) => {
            warn!("Dataset discovery failed: {}", e);
            println!("\n(Remote discovery unavailable: {e})");
        }
    }

    Ok(())
}

/// Build and connect the S3 store from connection arguments
async fn connect_store(connection: &ConnectionArgs) -> S3Store {
    let access_key = connection
        .access_key
        .clone()
        .or_else(|| std::env::var(env_keys::ACCESS_KEY).ok());
    let secret_key = connection
        .secret_key
        .clone()
        .or_else(|| std::env::var(env_keys::SECRET_KEY).ok());

    let mut config = StoreConfig::new(connection.endpoint.clone(), connection.bucket.clone());
    config.region = connection.region.clone();
    if let (Some(access_key), Some(secret_key)) = (access_key, secret_key) {
        config = config.with_credentials(access_key, secret_key);
    } else {
        info!("No credentials configured, using anonymous access");
    }

    S3Store::connect(config).await
}

/// Map a dataset argument to its base prefix
///
/// Catalog names resolve through the static table; anything containing '/'
/// is taken as a raw prefix. Unknown bare names are a configuration error.
fn dataset_prefix(dataset: &str) -> Result<String> {
    if let Some(info) = datasets::lookup(dataset) {
        return Ok(info.remote_prefix.to_string());
    }
    if dataset.contains('/') {
        return Ok(dataset.to_string());
    }
    Err(AppError::generic(format!(
        "Unknown dataset '{dataset}'. Use a catalog name (see 'dem_fetcher datasets') or a raw prefix containing '/'"
    )))
}

/// Resolve the final listing prefix from dataset and version arguments
async fn resolve_prefix(
    store: &dyn ObjectStore,
    dataset: &str,
    version: Option<&str>,
) -> Result<String> {
    let base = dataset_prefix(dataset)?;

    if let Some(version) = version {
        return Ok(format!("{}{}/", ensure_slash(&base), version.trim_matches('/')));
    }

    // No version requested: pick the most recent discovered one
    let base = ensure_slash(&base);
    let versions = discovery::discover_versions(store, &base).await?;
    match versions.into_iter().next() {
        Some(newest) if !newest.is_latest_sentinel() => {
            info!("Using latest discovered version {}", newest);
            Ok(newest.full_prefix)
        }
        _ => {
            info!("No version folders found, using base prefix");
            Ok(base)
        }
    }
}

fn ensure_slash(prefix: &str) -> String {
    if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Print the end-of-run summary
fn print_result(result: &DownloadResult) {
    if result.dry_run {
        println!(
            "Dry run: {} files, {} bytes would be downloaded",
            result.total_files, result.total_bytes
        );
        for key in &result.listed_keys {
            println!("  {key}");
        }
        return;
    }

    if result.total_files == 0 {
        println!("Nothing to download: {}", result.listing_status.describe());
        return;
    }

    println!(
        "Done in {:.1?}: {} downloaded, {} skipped, {} failed, {} bytes",
        result.elapsed,
        result.completed_files,
        result.skipped_files,
        result.failed_files,
        result.downloaded_bytes
    );
    if result.failed_files > 0 {
        println!("Some files failed; re-run to retry only the missing ones.");
    }
    if result.listing_status != ListingStatus::Matched {
        println!("Note: {}", result.listing_status.describe());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_prefix_resolution() {
        assert_eq!(
            dataset_prefix("COP-DEM_GLO-30-DGED").unwrap(),
            "COP-DEM_GLO-30-DGED/"
        );
        assert_eq!(dataset_prefix("custom/path").unwrap(), "custom/path");
        assert!(dataset_prefix("nonsense").is_err());
    }

    #[tokio::test]
    async fn resolve_prefix_prefers_explicit_version() {
        let store = crate::app::MemoryStore::new();
        let prefix = resolve_prefix(&store, "COP-DEM_GLO-30-DGED", Some("2023_1"))
            .await
            .unwrap();
        assert_eq!(prefix, "COP-DEM_GLO-30-DGED/2023_1/");
    }

    #[tokio::test]
    async fn resolve_prefix_discovers_latest() {
        let store = crate::app::MemoryStore::new();
        store.put("COP-DEM_GLO-30-DGED/2021_1/a.tif", b"x".to_vec());
        store.put("COP-DEM_GLO-30-DGED/2023_1/b.tif", b"x".to_vec());

        let prefix = resolve_prefix(&store, "COP-DEM_GLO-30-DGED", None)
            .await
            .unwrap();
        assert_eq!(prefix, "COP-DEM_GLO-30-DGED/2023_1/");
    }
}

//! Dataset and version discovery
//!
//! Walks the store's folder structure with delimiter listings: top-level
//! folders are datasets, and the sub-folders of a dataset named
//! `<year>_<release>` (optionally prefixed with the dataset name and a
//! double underscore) are versions. A dataset with no versioned sub-folders
//! is represented by the "Latest" sentinel pointing at its base prefix.

use tracing::debug;

use crate::app::datasets::{self, DatasetVersion, DiscoveredDataset};
use crate::app::store::ObjectStore;
use crate::errors::StoreResult;

/// List the dataset folders under a base prefix
///
/// Folder names are matched into the static catalog on a best-effort basis;
/// unknown folders are still returned and usable by prefix.
pub async fn discover_datasets(
    store: &dyn ObjectStore,
    base_prefix: &str,
) -> StoreResult<Vec<DiscoveredDataset>> {
    let prefixes = list_folders(store, base_prefix).await?;

    let mut discovered = Vec::with_capacity(prefixes.len());
    for full_prefix in prefixes {
        let name = folder_name(&full_prefix, base_prefix);
        let info = datasets::lookup(&name);
        discovered.push(DiscoveredDataset {
            name,
            full_prefix,
            info,
        });
    }

    debug!("Discovered {} dataset folders", discovered.len());
    Ok(discovered)
}

/// List the version sub-folders of a dataset, most recent first
///
/// Returns the "Latest" sentinel alone when the dataset has no recognizable
/// version folders.
pub async fn discover_versions(
    store: &dyn ObjectStore,
    dataset_prefix: &str,
) -> StoreResult<Vec<DatasetVersion>> {
    let prefixes = list_folders(store, dataset_prefix).await?;

    let mut versions = Vec::new();
    for full_prefix in prefixes {
        let name = folder_name(&full_prefix, dataset_prefix);
        if let Some((year, release)) = parse_version_name(&name) {
            versions.push(DatasetVersion {
                name,
                full_prefix,
                year,
                release,
            });
        }
    }

    if versions.is_empty() {
        debug!("No version folders under {dataset_prefix}, using base prefix");
        return Ok(vec![DatasetVersion::latest(dataset_prefix)]);
    }

    DatasetVersion::sort_most_recent_first(&mut versions);
    Ok(versions)
}

/// Collect all common prefixes under a prefix via delimiter listing
async fn list_folders(store: &dyn ObjectStore, prefix: &str) -> StoreResult<Vec<String>> {
    let mut folders = Vec::new();
    let mut token = None;

    loop {
        let page = store.list_page(prefix, Some("/"), token).await?;
        folders.extend(page.common_prefixes);
        match page.next_token {
            Some(t) => token = Some(t),
            None => break,
        }
    }

    Ok(folders)
}

/// Strip the parent prefix and trailing slash from a folder prefix
fn folder_name(full_prefix: &str, parent: &str) -> String {
    full_prefix
        .strip_prefix(parent)
        .unwrap_or(full_prefix)
        .trim_end_matches('/')
        .to_string()
}

/// Parse a version folder name into (year, release)
///
/// Accepts `2023_1` and `COP-DEM_GLO-30-DGED__2023_1` forms; the year must be
/// a four-digit number and the release a digit run.
fn parse_version_name(name: &str) -> Option<(String, String)> {
    let tail = match name.rsplit_once("__") {
        Some((_, tail)) => tail,
        None => name,
    };

    let (year, release) = tail.rsplit_once('_')?;
    let year_ok = year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit());
    let release_ok = !release.is_empty() && release.bytes().all(|b| b.is_ascii_digit());

    if year_ok && release_ok {
        Some((year.to_string(), release.to_string()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::store::MemoryStore;

    #[tokio::test]
    async fn discovers_datasets_and_matches_catalog() {
        let store = MemoryStore::new();
        store.put("COP-DEM_GLO-30-DGED/2023_1/a.tif", b"x".to_vec());
        store.put("COP-DEM_GLO-90-DTED/2022_1/b.tif", b"x".to_vec());
        store.put("EXPERIMENTAL-DEM/c.tif", b"x".to_vec());

        let datasets = discover_datasets(&store, "").await.unwrap();
        assert_eq!(datasets.len(), 3);

        let known = datasets
            .iter()
            .find(|d| d.name == "COP-DEM_GLO-30-DGED")
            .unwrap();
        assert!(known.info.is_some());
        assert_eq!(known.full_prefix, "COP-DEM_GLO-30-DGED/");

        let unknown = datasets
            .iter()
            .find(|d| d.name == "EXPERIMENTAL-DEM")
            .unwrap();
        assert!(unknown.info.is_none());
    }

    #[tokio::test]
    async fn discovers_versions_most_recent_first() {
        let store = MemoryStore::new();
        store.put("d/2021_2/a.tif", b"x".to_vec());
        store.put("d/2023_1/b.tif", b"x".to_vec());
        store.put("d/2021_10/c.tif", b"x".to_vec());
        store.put("d/docs/readme.txt", b"x".to_vec());

        let versions = discover_versions(&store, "d/").await.unwrap();
        let names: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["2023_1", "2021_10", "2021_2"]);
        assert_eq!(versions[0].full_prefix, "d/2023_1/");
    }

    #[tokio::test]
    async fn dataset_qualified_version_folders_are_recognized() {
        let store = MemoryStore::new();
        store.put(
            "COP-DEM_GLO-30-DGED/COP-DEM_GLO-30-DGED__2023_1/a.tif",
            b"x".to_vec(),
        );

        let versions = discover_versions(&store, "COP-DEM_GLO-30-DGED/")
            .await
            .unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].year, "2023");
        assert_eq!(versions[0].release, "1");
    }

    #[tokio::test]
    async fn missing_version_folders_yield_latest_sentinel() {
        let store = MemoryStore::new();
        store.put("flat/tile_DEM.tif", b"x".to_vec());

        let versions = discover_versions(&store, "flat/").await.unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].is_latest_sentinel());
        assert_eq!(versions[0].full_prefix, "flat/");
    }
}

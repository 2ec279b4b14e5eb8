//! Resume ledger persistence tests
//!
//! The state file is the only thing that survives between runs, so these
//! tests cover exact serialized shape, large ledgers, awkward keys, and the
//! strict/tolerant loading split.

use tempfile::TempDir;

use dem_fetcher::app::DownloadState;
use dem_fetcher::errors::StateError;

/// Serialized field names stay fixed so old state files keep loading
#[tokio::test]
async fn test_state_file_wire_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let mut state = DownloadState::default();
    state.record("prefix/tile_DEM.tif", 1024, "\"abc123\"");
    state.save(&path).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"Files\""));
    assert!(raw.contains("\"Size\""));
    assert!(raw.contains("\"ETag\""));
    assert!(raw.contains("\"Downloaded\""));
    assert!(raw.contains("prefix/tile_DEM.tif"));
}

/// Keys with spaces, parentheses, and non-ASCII characters round-trip
#[tokio::test]
async fn test_awkward_keys_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let keys = [
        "data/tile (copy 1).tif",
        "data/Ägypten/tile_DEM.tif",
        "data/山地/tile_DEM.tif",
        "data/with spaces/and \"quotes\".tif",
    ];

    let mut state = DownloadState::default();
    for (i, key) in keys.iter().enumerate() {
        state.record(*key, (i as u64 + 1) * 100, format!("\"etag-{i}\""));
    }
    state.save(&path).await.unwrap();

    let loaded = DownloadState::load(&path).await.unwrap();
    assert_eq!(loaded.len(), keys.len());
    for key in keys {
        assert!(loaded.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(loaded.get(keys[1]).unwrap().size, 200);
}

/// A ledger with many entries survives a save and reload intact
#[tokio::test]
async fn test_large_ledger_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let mut state = DownloadState::default();
    for i in 0..10_000 {
        state.record(
            format!("COP-DEM_GLO-30-DGED/2023_1/tile_{i:05}_DEM.tif"),
            i as u64,
            format!("\"{i:08x}\""),
        );
    }
    state.save(&path).await.unwrap();

    let loaded = DownloadState::load(&path).await.unwrap();
    assert_eq!(loaded.len(), 10_000);
    let entry = loaded
        .get("COP-DEM_GLO-30-DGED/2023_1/tile_04242_DEM.tif")
        .unwrap();
    assert_eq!(entry.size, 4242);
}

/// A missing file is fine for the tolerant loader, an error for the strict one
#[tokio::test]
async fn test_missing_file_split() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.json");

    let tolerant = DownloadState::load_or_default(&path).await;
    assert!(tolerant.is_empty());

    assert!(matches!(
        DownloadState::load(&path).await,
        Err(StateError::Io { .. })
    ));
}

/// A corrupt file starts a fresh ledger tolerantly, errors strictly
#[tokio::test]
async fn test_corrupt_file_split() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let tolerant = DownloadState::load_or_default(&path).await;
    assert!(tolerant.is_empty());

    assert!(matches!(
        DownloadState::load(&path).await,
        Err(StateError::Corrupt { .. })
    ));
}

/// Saving never leaves a half-written state file next to the real one
#[tokio::test]
async fn test_save_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let mut state = DownloadState::default();
    state.record("a.tif", 1, "\"e\"");
    state.save(&path).await.unwrap();
    state.record("b.tif", 2, "\"f\"");
    state.save(&path).await.unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["state.json"]);
}

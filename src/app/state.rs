//! Persisted resume ledger
//!
//! Maps remote object keys to the size, content tag, and timestamp of their
//! last successful download. Loaded at run start and written at run end; a
//! missing or corrupt file is treated as an empty ledger so a damaged state
//! file can never fail a run. The strict [`DownloadState::load`] is available
//! when corruption must surface as an error.
//!
//! On-disk format (field names are part of the format and round-trip exactly):
//!
//! ```json
//! { "Files": { "<object-key>": { "Size": 123, "ETag": "\"abc\"", "Downloaded": "2026-01-01T00:00:00Z" } } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::constants::files::TEMP_FILE_SUFFIX;
use crate::errors::{StateError, StateResult};

/// Recorded outcome of one successful file download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Object size in bytes at download time
    #[serde(rename = "Size")]
    pub size: u64,
    /// Content tag reported by the store at download time
    #[serde(rename = "ETag")]
    pub etag: String,
    /// When the download completed, UTC
    #[serde(rename = "Downloaded")]
    pub downloaded: DateTime<Utc>,
}

/// The resume ledger for one output directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadState {
    /// Per-key download records
    #[serde(rename = "Files")]
    pub files: HashMap<String, FileState>,
}

impl DownloadState {
    /// Load the ledger, treating a missing or corrupt file as empty
    pub async fn load_or_default(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(state) => state,
            Err(StateError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, starting fresh", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable state file: {}", e);
                Self::default()
            }
        }
    }

    /// Load the ledger strictly
    ///
    /// A missing file and invalid JSON are both hard errors here.
    pub async fn load(path: &Path) -> StateResult<Self> {
        let raw = fs::read(path).await.map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&raw).map_err(|source| StateError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the ledger via a temp file and atomic rename
    pub async fn save(&self, path: &Path) -> StateResult<()> {
        let io_err = |source| StateError::Io {
            path: path.to_path_buf(),
            source,
        };

        let raw = serde_json::to_vec_pretty(self).map_err(|source| StateError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_path = path.with_file_name(format!(
            "{}{}",
            path.file_name().unwrap_or_default().to_string_lossy(),
            TEMP_FILE_SUFFIX
        ));

        fs::write(&temp_path, &raw).await.map_err(io_err)?;
        fs::rename(&temp_path, path).await.map_err(io_err)?;

        debug!(
            "Saved state file with {} entries to {}",
            self.files.len(),
            path.display()
        );
        Ok(())
    }

    /// Look up the record for a key
    pub fn get(&self, key: &str) -> Option<&FileState> {
        self.files.get(key)
    }

    /// Record a successful download
    pub fn record(&mut self, key: impl Into<String>, size: u64, etag: impl Into<String>) {
        self.files.insert(
            key.into(),
            FileState {
                size,
                etag: etag.into(),
                downloaded: Utc::now(),
            },
        );
    }

    /// Number of recorded files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when no downloads have been recorded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn round_trips_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut state = DownloadState::default();
        state.record("a/tile_DEM.tif", 42, "\"e1\"");
        state.record("b with spaces/(parens)/tile_WBM.tif", 7, "\"e2\"");
        state.record("c/höhenmodell_DEM.tif", 1024, "\"e3\"");

        state.save(&path).await.unwrap();
        let loaded = DownloadState::load(&path).await.unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.get("a/tile_DEM.tif").unwrap().size, 42);
    }

    #[tokio::test]
    async fn serialized_field_names_match_format() {
        let mut state = DownloadState::default();
        state.record("k", 1, "\"e\"");

        let json = serde_json::to_value(&state).unwrap();
        let entry = &json["Files"]["k"];
        assert!(entry["Size"].is_u64());
        assert!(entry["ETag"].is_string());
        assert!(entry["Downloaded"].is_string());
    }

    #[tokio::test]
    async fn missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let state = DownloadState::load_or_default(&path).await;
        assert!(state.is_empty());

        // The strict path surfaces the same condition as an error
        assert!(DownloadState::load(&path).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_file_is_tolerated_only_on_fallback_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let state = DownloadState::load_or_default(&path).await;
        assert!(state.is_empty());

        match DownloadState::load(&path).await {
            Err(StateError::Corrupt { .. }) => {}
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }
}

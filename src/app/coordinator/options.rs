//! Frozen per-run download configuration
//!
//! One `DownloadOptions` instance is never mutated mid-run; deriving a
//! variant (for example toggling `force`) always produces a new instance via
//! the consuming `with_*` methods. Connection settings live in
//! [`crate::app::store::StoreConfig`] and are consumed when the store is
//! constructed, before a run begins.

use std::path::PathBuf;
use std::time::Duration;

use crate::app::bbox::BoundingBox;
use crate::app::models::MaskSelection;
use crate::constants::{files, limits};

/// Configuration for one download run
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Source prefix under which objects are listed
    pub prefix: String,
    /// Local output directory
    pub output_dir: PathBuf,
    /// Concurrent transfers, clamped to 1..=32
    pub parallelism: usize,
    /// Retry attempts per file, clamped to 0..=10
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts
    pub retry_base_delay: Duration,
    /// Name of the resume ledger inside the output directory
    pub state_file: String,
    /// Re-download files even when the resume check would skip them
    pub force: bool,
    /// List and report without transferring anything
    pub dry_run: bool,
    /// Mask layers to download
    pub masks: MaskSelection,
    /// Optional geographic filter
    pub bbox: Option<BoundingBox>,
}

impl DownloadOptions {
    /// Create options with defaults for everything but the source and target
    pub fn new(prefix: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            output_dir: output_dir.into(),
            parallelism: limits::DEFAULT_PARALLEL,
            max_retries: limits::DEFAULT_RETRIES,
            retry_base_delay: Duration::from_secs(1),
            state_file: files::DEFAULT_STATE_FILE.to_string(),
            force: false,
            dry_run: false,
            masks: MaskSelection::default(),
            bbox: None,
        }
    }

    /// Set the number of concurrent transfers, clamped to the valid range
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.clamp(limits::MIN_PARALLEL, limits::MAX_PARALLEL);
        self
    }

    /// Set the per-file retry budget, clamped to the valid range
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.min(limits::MAX_RETRIES);
        self
    }

    /// Set the backoff base delay
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the state-file name
    pub fn with_state_file(mut self, name: impl Into<String>) -> Self {
        self.state_file = name.into();
        self
    }

    /// Set the force flag
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the dry-run flag
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the mask selection
    pub fn with_masks(mut self, masks: MaskSelection) -> Self {
        self.masks = masks;
        self
    }

    /// Set the bounding-box filter
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Source prefix trimmed and forced to end with '/'
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.prefix.trim();
        if trimmed.is_empty() || trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        }
    }

    /// Full path of the resume ledger
    pub fn state_file_path(&self) -> PathBuf {
        self.output_dir.join(&self.state_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::MaskType;

    #[test]
    fn limits_are_clamped() {
        let options = DownloadOptions::new("p", "out")
            .with_parallelism(0)
            .with_max_retries(99);
        assert_eq!(options.parallelism, 1);
        assert_eq!(options.max_retries, 10);

        let options = DownloadOptions::new("p", "out").with_parallelism(1000);
        assert_eq!(options.parallelism, 32);
    }

    #[test]
    fn with_methods_produce_new_instances() {
        let base = DownloadOptions::new("p", "out");
        let forced = base.clone().with_force(true);

        assert!(!base.force);
        assert!(forced.force);
        assert_eq!(base.prefix, forced.prefix);
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(
            DownloadOptions::new("  d/2023_1  ", "out").normalized_prefix(),
            "d/2023_1/"
        );
        assert_eq!(
            DownloadOptions::new("d/2023_1/", "out").normalized_prefix(),
            "d/2023_1/"
        );
        assert_eq!(DownloadOptions::new("", "out").normalized_prefix(), "");
    }

    #[test]
    fn defaults() {
        let options = DownloadOptions::new("p", "out");
        assert_eq!(options.parallelism, 4);
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.state_file, "download-state.json");
        assert!(options.masks.contains(MaskType::Dem));
        assert!(options.bbox.is_none());
        assert!(!options.force);
        assert!(!options.dry_run);
    }
}

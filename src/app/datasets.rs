//! Static Copernicus DEM dataset catalog
//!
//! The catalog is immutable configuration data built once at first use and
//! treated as read-only afterwards. Discovery results are matched into it on
//! a best-effort basis; datasets missing from the catalog are still usable
//! through their raw prefix.

use std::sync::OnceLock;

/// Geographic coverage of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Worldwide coverage
    Global,
    /// European coverage only
    European,
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coverage::Global => f.write_str("Global"),
            Coverage::European => f.write_str("European"),
        }
    }
}

/// Distribution format of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Defence Gridded Elevation Data
    Dged,
    /// Digital Terrain Elevation Data
    Dted,
}

impl std::fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetFormat::Dged => f.write_str("DGED"),
            DatasetFormat::Dted => f.write_str("DTED"),
        }
    }
}

/// Static descriptor for a known dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    /// Dataset name, matching the top-level folder in the store
    pub name: &'static str,
    /// Remote prefix under which the dataset's objects live
    pub remote_prefix: &'static str,
    /// Human description
    pub description: &'static str,
    /// Grid resolution in meters
    pub resolution_m: u32,
    /// Geographic coverage
    pub coverage: Coverage,
    /// Distribution format
    pub format: DatasetFormat,
    /// Whether the dataset is publicly accessible without credentials
    pub is_public: bool,
}

/// A dataset folder found by discovery, best-effort matched into the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredDataset {
    /// Folder name as found in the store
    pub name: String,
    /// Full listing prefix ending with '/'
    pub full_prefix: String,
    /// Catalog entry, when the name is known
    pub info: Option<&'static DatasetInfo>,
}

/// A versioned sub-folder of a dataset
///
/// `year == "Latest"` with an empty release is the sentinel for "no versioned
/// sub-folder exists, use the base dataset prefix directly".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetVersion {
    /// Folder name as found in the store
    pub name: String,
    /// Full listing prefix ending with '/'
    pub full_prefix: String,
    /// Release year, or "Latest" for the sentinel
    pub year: String,
    /// Release number within the year, empty for the sentinel
    pub release: String,
}

impl DatasetVersion {
    /// The sentinel version pointing at the base dataset prefix
    pub fn latest(base_prefix: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            full_prefix: base_prefix.into(),
            year: "Latest".to_string(),
            release: String::new(),
        }
    }

    /// True for the "use the base prefix" sentinel
    pub fn is_latest_sentinel(&self) -> bool {
        self.year == "Latest"
    }

    /// Sort versions most recent first, sentinel (if any) leading
    ///
    /// Year and release are compared numerically where both parse, falling
    /// back to string comparison for opaque values.
    pub fn sort_most_recent_first(versions: &mut [DatasetVersion]) {
        fn component_desc(a: &str, b: &str) -> std::cmp::Ordering {
            match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(x), Ok(y)) => y.cmp(&x),
                _ => b.cmp(a),
            }
        }

        versions.sort_by(|a, b| {
            let rank = |v: &DatasetVersion| u8::from(!v.is_latest_sentinel());
            rank(a)
                .cmp(&rank(b))
                .then_with(|| component_desc(&a.year, &b.year))
                .then_with(|| component_desc(&a.release, &b.release))
        });
    }
}

impl std::fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_latest_sentinel() {
            f.write_str("Latest")
        } else {
            write!(f, "{}_{}", self.year, self.release)
        }
    }
}

/// The static dataset catalog
pub fn catalog() -> &'static [DatasetInfo] {
    static CATALOG: OnceLock<Vec<DatasetInfo>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            DatasetInfo {
                name: "COP-DEM_GLO-30-DGED",
                remote_prefix: "COP-DEM_GLO-30-DGED/",
                description: "Copernicus DEM, 30m global, DGED format",
                resolution_m: 30,
                coverage: Coverage::Global,
                format: DatasetFormat::Dged,
                is_public: true,
            },
            DatasetInfo {
                name: "COP-DEM_GLO-30-DTED",
                remote_prefix: "COP-DEM_GLO-30-DTED/",
                description: "Copernicus DEM, 30m global, DTED format",
                resolution_m: 30,
                coverage: Coverage::Global,
                format: DatasetFormat::Dted,
                is_public: true,
            },
            DatasetInfo {
                name: "COP-DEM_GLO-90-DGED",
                remote_prefix: "COP-DEM_GLO-90-DGED/",
                description: "Copernicus DEM, 90m global, DGED format",
                resolution_m: 90,
                coverage: Coverage::Global,
                format: DatasetFormat::Dged,
                is_public: true,
            },
            DatasetInfo {
                name: "COP-DEM_GLO-90-DTED",
                remote_prefix: "COP-DEM_GLO-90-DTED/",
                description: "Copernicus DEM, 90m global, DTED format",
                resolution_m: 90,
                coverage: Coverage::Global,
                format: DatasetFormat::Dted,
                is_public: true,
            },
            DatasetInfo {
                name: "COP-DEM_EEA-10-DGED",
                remote_prefix: "COP-DEM_EEA-10-DGED/",
                description: "Copernicus DEM, 10m European, DGED format",
                resolution_m: 10,
                coverage: Coverage::European,
                format: DatasetFormat::Dged,
                is_public: false,
            },
            DatasetInfo {
                name: "COP-DEM_EEA-10-INSP",
                remote_prefix: "COP-DEM_EEA-10-INSP/",
                description: "Copernicus DEM, 10m European, INSPIRE-compliant DGED",
                resolution_m: 10,
                coverage: Coverage::European,
                format: DatasetFormat::Dged,
                is_public: false,
            },
        ]
    })
}

/// Look up a catalog entry by dataset name, case-insensitive
pub fn lookup(name: &str) -> Option<&'static DatasetInfo> {
    catalog()
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
}

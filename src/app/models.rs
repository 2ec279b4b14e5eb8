//! Core data models for DEM Fetcher
//!
//! Defines the mask-layer selection type, the remote object record produced
//! by listing, and small shared value types used across the application.

use serde::{Deserialize, Serialize};

/// One of the five data layers stored per elevation tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskType {
    /// Digital elevation model, the primary layer
    Dem,
    /// Editing mask
    Edm,
    /// Filling mask
    Flm,
    /// Height error mask
    Hem,
    /// Water body mask
    Wbm,
}

impl MaskType {
    /// All mask kinds in canonical order
    pub const ALL: [MaskType; 5] = [
        MaskType::Dem,
        MaskType::Edm,
        MaskType::Flm,
        MaskType::Hem,
        MaskType::Wbm,
    ];

    /// Fixed filename suffix identifying this layer
    pub fn suffix(&self) -> &'static str {
        match self {
            MaskType::Dem => "_DEM.tif",
            MaskType::Edm => "_EDM.tif",
            MaskType::Flm => "_FLM.tif",
            MaskType::Hem => "_HEM.tif",
            MaskType::Wbm => "_WBM.tif",
        }
    }

    /// Human description of the layer
    pub fn description(&self) -> &'static str {
        match self {
            MaskType::Dem => "Digital elevation model",
            MaskType::Edm => "Editing mask",
            MaskType::Flm => "Filling mask",
            MaskType::Hem => "Height error mask",
            MaskType::Wbm => "Water body mask",
        }
    }

    /// Parse a mask kind from its short name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DEM" => Some(MaskType::Dem),
            "EDM" => Some(MaskType::Edm),
            "FLM" => Some(MaskType::Flm),
            "HEM" => Some(MaskType::Hem),
            "WBM" => Some(MaskType::Wbm),
            _ => None,
        }
    }

    /// Short display name of the layer
    pub fn name(&self) -> &'static str {
        match self {
            MaskType::Dem => "DEM",
            MaskType::Edm => "EDM",
            MaskType::Flm => "FLM",
            MaskType::Hem => "HEM",
            MaskType::Wbm => "WBM",
        }
    }
}

impl std::fmt::Display for MaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of mask kinds selected for one run
///
/// DEM is a structurally required member: an empty request defaults to DEM,
/// and any non-empty selection always includes DEM. Iteration yields members
/// in the canonical order DEM, EDM, FLM, HEM, WBM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskSelection {
    members: [bool; 5],
}

impl MaskSelection {
    /// Selection containing only DEM, the default
    pub fn dem_only() -> Self {
        Self::from_kinds([MaskType::Dem])
    }

    /// Build a selection from an iterator of kinds
    ///
    /// An empty iterator yields the DEM-only default; a non-empty one always
    /// has DEM added regardless of whether it was requested.
    pub fn from_kinds(kinds: impl IntoIterator<Item = MaskType>) -> Self {
        let mut members = [false; 5];
        for kind in kinds {
            members[kind as usize] = true;
        }
        // DEM is never filtered away
        members[MaskType::Dem as usize] = true;
        Self { members }
    }

    /// Parse a comma-separated list of mask names (e.g. "dem,wbm")
    ///
    /// An empty or whitespace-only input yields the DEM-only default.
    pub fn parse(input: &str) -> Result<Self, String> {
        if input.trim().is_empty() {
            return Ok(Self::dem_only());
        }

        let mut kinds = Vec::new();
        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match MaskType::from_name(token) {
                Some(kind) => kinds.push(kind),
                None => {
                    return Err(format!(
                        "Unknown mask type '{token}'. Valid types: DEM, EDM, FLM, HEM, WBM"
                    ))
                }
            }
        }

        Ok(Self::from_kinds(kinds))
    }

    /// Whether a kind is a member of this selection
    pub fn contains(&self, kind: MaskType) -> bool {
        self.members[kind as usize]
    }

    /// Members in canonical order
    pub fn iter(&self) -> impl Iterator<Item = MaskType> + '_ {
        MaskType::ALL.into_iter().filter(|k| self.contains(*k))
    }

    /// Number of selected kinds
    pub fn len(&self) -> usize {
        self.members.iter().filter(|m| **m).count()
    }

    /// A selection is never empty; provided for completeness
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Union of two selections
    pub fn union(&self, other: &Self) -> Self {
        let mut members = [false; 5];
        for (i, slot) in members.iter_mut().enumerate() {
            *slot = self.members[i] || other.members[i];
        }
        Self { members }
    }
}

impl Default for MaskSelection {
    fn default() -> Self {
        Self::dem_only()
    }
}

impl std::fmt::Display for MaskSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(|k| k.name()).collect();
        f.write_str(&names.join(","))
    }
}

/// One object returned by a store listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Full object key, including the dataset prefix
    pub key: String,
    /// Object size in bytes, known from the listing
    pub size: u64,
    /// Content tag reported by the store (S3 ETag)
    pub etag: String,
}

impl RemoteObject {
    /// Create a remote object record
    pub fn new(key: impl Into<String>, size: u64, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size,
            etag: etag.into(),
        }
    }

    /// The filename portion of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_suffixes_and_names() {
        assert_eq!(MaskType::Dem.suffix(), "_DEM.tif");
        assert_eq!(MaskType::Wbm.suffix(), "_WBM.tif");
        assert_eq!(MaskType::from_name("wbm"), Some(MaskType::Wbm));
        assert_eq!(MaskType::from_name(" hem "), Some(MaskType::Hem));
        assert_eq!(MaskType::from_name("tif"), None);
    }

    #[test]
    fn empty_selection_defaults_to_dem() {
        let selection = MaskSelection::from_kinds([]);
        assert!(selection.contains(MaskType::Dem));
        assert_eq!(selection.len(), 1);

        let parsed = MaskSelection::parse("").unwrap();
        assert_eq!(parsed, MaskSelection::dem_only());
    }

    #[test]
    fn dem_is_always_included() {
        let selection = MaskSelection::from_kinds([MaskType::Wbm, MaskType::Flm]);
        assert!(selection.contains(MaskType::Dem));
        assert!(selection.contains(MaskType::Wbm));
        assert!(selection.contains(MaskType::Flm));
        assert!(!selection.contains(MaskType::Edm));
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn iteration_order_is_canonical() {
        let selection = MaskSelection::from_kinds([MaskType::Wbm, MaskType::Edm]);
        let order: Vec<MaskType> = selection.iter().collect();
        assert_eq!(order, vec![MaskType::Dem, MaskType::Edm, MaskType::Wbm]);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = MaskSelection::parse("dem,xyz").unwrap_err();
        assert!(err.contains("xyz"));

        let selection = MaskSelection::parse("wbm, hem").unwrap();
        assert_eq!(selection.to_string(), "DEM,HEM,WBM");
    }

    #[test]
    fn remote_object_file_name() {
        let obj = RemoteObject::new("prefix/a/b/tile_DEM.tif", 10, "etag");
        assert_eq!(obj.file_name(), "tile_DEM.tif");

        let flat = RemoteObject::new("flat.tif", 1, "e");
        assert_eq!(flat.file_name(), "flat.tif");
    }
}

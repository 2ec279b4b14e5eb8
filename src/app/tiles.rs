//! Tile coordinate parsing from object keys
//!
//! Copernicus DEM object keys embed the tile's southwest corner as a
//! hemisphere-tagged degree/minute pair, for example
//! `Copernicus_DSM_COG_10_S45_30_W006_30_DEM.tif` encodes 45°30'S, 6°30'W.
//! Parsing is pure string work with no I/O; keys that do not carry the
//! pattern are treated as "no match", never as an error.

use crate::app::bbox::BoundingBox;
use crate::app::models::MaskSelection;

/// A tile's southwest corner decoded from a filename
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCoordinate {
    /// Latitude in degrees, negative south of the equator
    pub lat: f64,
    /// Longitude in degrees, negative west of Greenwich
    pub lon: f64,
}

/// Extract the tile coordinate embedded in an object key
///
/// The key must contain a `_[NS]<deg>_<min>_[EW]<deg>_<min>_` group with the
/// degree and minute fields as decimal digit runs. Returns `None` when the
/// pattern is absent.
pub fn parse_coordinates(key: &str) -> Option<TileCoordinate> {
    let parts: Vec<&str> = key.split('_').collect();

    // The pattern spans four consecutive underscore-separated fields:
    // [NS]deg, min, [EW]deg, min. Surrounding underscores mean the group can
    // be neither the first nor the last field of the key.
    for window_start in 1..parts.len().saturating_sub(4) {
        let window = &parts[window_start..window_start + 4];

        let (lat_deg, lat_south) = match parse_hemisphere_degrees(window[0], 'N', 'S') {
            Some(v) => v,
            None => continue,
        };
        let lat_min = match parse_minutes(window[1]) {
            Some(v) => v,
            None => continue,
        };
        let (lon_deg, lon_west) = match parse_hemisphere_degrees(window[2], 'E', 'W') {
            Some(v) => v,
            None => continue,
        };
        let lon_min = match parse_minutes(window[3]) {
            Some(v) => v,
            None => continue,
        };

        let mut lat = lat_deg + lat_min / 60.0;
        if lat_south {
            lat = -lat;
        }
        let mut lon = lon_deg + lon_min / 60.0;
        if lon_west {
            lon = -lon;
        }

        return Some(TileCoordinate { lat, lon });
    }

    None
}

/// Parse a field like "S45" into degrees plus a negation flag
fn parse_hemisphere_degrees(field: &str, positive: char, negative: char) -> Option<(f64, bool)> {
    let mut chars = field.chars();
    let hemisphere = chars.next()?;
    let digits = chars.as_str();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let degrees: f64 = digits.parse().ok()?;
    if hemisphere == positive {
        Some((degrees, false))
    } else if hemisphere == negative {
        Some((degrees, true))
    } else {
        None
    }
}

/// Parse a minutes field, a pure digit run
fn parse_minutes(field: &str) -> Option<f64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// True when the key ends with the suffix of at least one selected mask kind
///
/// Suffix comparison is case-insensitive.
pub fn matches_mask_filter(key: &str, masks: &MaskSelection) -> bool {
    let lower = key.to_ascii_lowercase();
    masks
        .iter()
        .any(|kind| lower.ends_with(&kind.suffix().to_ascii_lowercase()))
}

/// Geographic filter for one key against a bounding box
///
/// Fail-open: keys without a parseable coordinate are always included rather
/// than silently dropped. Parsed coordinates are treated as the southwest
/// corner of a 1°x1° tile.
pub fn is_in_bounding_box(key: &str, bbox: &BoundingBox) -> bool {
    match parse_coordinates(key) {
        Some(coord) => bbox.intersects_tile(coord.lon, coord.lat),
        None => true,
    }
}

//! Geographic bounding box with parsing and normalization
//!
//! A bounding box is constructed once from four raw numbers and immutable
//! afterwards. Construction applies a normalization policy (longitude swap,
//! latitude swap, range clamping); any step taken is recorded so the CLI can
//! warn the user about a suspicious input without rejecting it.

use crate::constants::tiles::{KM_PER_DEGREE, TILE_HEIGHT_DEGREES, TILE_WIDTH_DEGREES};
use crate::errors::BboxError;

/// Geographic rectangle in degrees, min corner to max corner
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    was_normalized: bool,
    normalization_warning: Option<String>,
}

impl BoundingBox {
    /// Create a bounding box from four raw values, applying normalization
    ///
    /// Normalization order: swap longitudes if reversed, swap latitudes if
    /// reversed, clamp all four values into `[-180, 180] x [-90, 90]`.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        let mut bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
            was_normalized: false,
            normalization_warning: None,
        };

        if bbox.min_lon > bbox.max_lon {
            std::mem::swap(&mut bbox.min_lon, &mut bbox.max_lon);
            bbox.note_normalization("longitude values were swapped (min > max)");
        }

        if bbox.min_lat > bbox.max_lat {
            std::mem::swap(&mut bbox.min_lat, &mut bbox.max_lat);
            bbox.note_normalization("latitude values were swapped (min > max)");
        }

        let clamped_lon_min = bbox.min_lon.clamp(-180.0, 180.0);
        let clamped_lon_max = bbox.max_lon.clamp(-180.0, 180.0);
        let clamped_lat_min = bbox.min_lat.clamp(-90.0, 90.0);
        let clamped_lat_max = bbox.max_lat.clamp(-90.0, 90.0);

        if clamped_lon_min != bbox.min_lon
            || clamped_lon_max != bbox.max_lon
            || clamped_lat_min != bbox.min_lat
            || clamped_lat_max != bbox.max_lat
        {
            bbox.min_lon = clamped_lon_min;
            bbox.max_lon = clamped_lon_max;
            bbox.min_lat = clamped_lat_min;
            bbox.max_lat = clamped_lat_max;
            bbox.note_normalization("values were clamped to valid coordinate ranges");
        }

        bbox
    }

    fn note_normalization(&mut self, note: &str) {
        self.was_normalized = true;
        match &mut self.normalization_warning {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(note);
            }
            None => self.normalization_warning = Some(note.to_string()),
        }
    }

    /// Parse a bounding box from text
    ///
    /// Accepts four numbers in order `min_lon,min_lat,max_lon,max_lat`,
    /// separated by commas, whitespace, or semicolons (mixed separators are
    /// tolerated).
    pub fn parse(input: &str) -> Result<Self, BboxError> {
        if input.trim().is_empty() {
            return Err(BboxError::Empty);
        }

        let tokens: Vec<&str> = input
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.len() != 4 {
            return Err(BboxError::WrongTokenCount {
                found: tokens.len(),
            });
        }

        let mut values = [0.0_f64; 4];
        for (slot, token) in values.iter_mut().zip(&tokens) {
            *slot = token.parse().map_err(|_| BboxError::InvalidNumber {
                token: token.to_string(),
            })?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Non-failing variant of [`BoundingBox::parse`]
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Minimum longitude in degrees
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    /// Minimum latitude in degrees
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    /// Maximum longitude in degrees
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Maximum latitude in degrees
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// True when construction had to adjust the raw input
    pub fn was_normalized(&self) -> bool {
        self.was_normalized
    }

    /// Human-readable notes about normalization steps taken, if any
    pub fn normalization_warning(&self) -> Option<&str> {
        self.normalization_warning.as_deref()
    }

    /// Inclusive point-in-rectangle test
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Axis-aligned overlap test against a tile anchored at its southwest corner
    ///
    /// Inclusive of touching edges and corners.
    pub fn intersects_tile(&self, tile_lon: f64, tile_lat: f64) -> bool {
        self.intersects_tile_sized(tile_lon, tile_lat, TILE_WIDTH_DEGREES, TILE_HEIGHT_DEGREES)
    }

    /// Overlap test with an explicit tile footprint
    pub fn intersects_tile_sized(
        &self,
        tile_lon: f64,
        tile_lat: f64,
        tile_width: f64,
        tile_height: f64,
    ) -> bool {
        self.min_lon <= tile_lon + tile_width
            && self.max_lon >= tile_lon
            && self.min_lat <= tile_lat + tile_height
            && self.max_lat >= tile_lat
    }

    /// Area of the box in square degrees
    pub fn area_degrees(&self) -> f64 {
        (self.max_lon - self.min_lon) * (self.max_lat - self.min_lat)
    }

    /// Approximate area in square kilometers
    ///
    /// Longitudinal degree length is scaled by the cosine of the mean latitude.
    pub fn approx_area_km2(&self) -> f64 {
        let mean_lat = (self.min_lat + self.max_lat) / 2.0;
        let width_km = (self.max_lon - self.min_lon) * KM_PER_DEGREE * mean_lat.to_radians().cos();
        let height_km = (self.max_lat - self.min_lat) * KM_PER_DEGREE;
        width_km * height_km
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) to ({}, {})",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_all_separators() {
        let expected = BoundingBox::new(-10.0, 35.0, 30.0, 60.0);

        for input in [
            "-10,35,30,60",
            "-10 35 30 60",
            "-10;35;30;60",
            "-10, 35; 30  60",
        ] {
            assert_eq!(BoundingBox::parse(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn parse_swaps_reversed_longitudes() {
        let bbox = BoundingBox::parse("30,35,-10,60").unwrap();

        assert_eq!(bbox.min_lon(), -10.0);
        assert_eq!(bbox.min_lat(), 35.0);
        assert_eq!(bbox.max_lon(), 30.0);
        assert_eq!(bbox.max_lat(), 60.0);
        assert!(bbox.was_normalized());
        assert!(bbox.normalization_warning().unwrap().contains("longitude"));
    }

    #[test]
    fn parse_clamps_out_of_range_values() {
        let bbox = BoundingBox::parse("-200,35,200,60").unwrap();

        assert_eq!(bbox.min_lon(), -180.0);
        assert_eq!(bbox.max_lon(), 180.0);
        assert!(bbox.was_normalized());
        assert!(bbox.normalization_warning().unwrap().contains("clamped"));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(BoundingBox::parse(""), Err(BboxError::Empty));
        assert_eq!(BoundingBox::parse("   "), Err(BboxError::Empty));
        assert_eq!(
            BoundingBox::parse("1,2,3"),
            Err(BboxError::WrongTokenCount { found: 3 })
        );
        assert_eq!(
            BoundingBox::parse("1,2,3,4,5"),
            Err(BboxError::WrongTokenCount { found: 5 })
        );
        assert_eq!(
            BoundingBox::parse("1,2,x,4"),
            Err(BboxError::InvalidNumber {
                token: "x".to_string()
            })
        );

        assert!(BoundingBox::try_parse("1,2,x,4").is_none());
        assert!(BoundingBox::try_parse("1,2,3,4").is_some());
    }

    #[test]
    fn intersects_tile_includes_touching_edges() {
        let bbox = BoundingBox::new(10.0, 45.0, 20.0, 55.0);

        // Tiles anchored exactly at the box corners
        assert!(bbox.intersects_tile(10.0, 45.0));
        assert!(bbox.intersects_tile(19.0, 54.0));

        // Tile whose northeast corner just touches the box southwest corner
        assert!(bbox.intersects_tile(9.0, 44.0));

        // Clearly outside
        assert!(!bbox.intersects_tile(8.0, 45.0));
        assert!(!bbox.intersects_tile(10.0, 43.0));
        assert!(!bbox.intersects_tile(21.0, 56.0));
    }

    #[test]
    fn contains_is_inclusive() {
        let bbox = BoundingBox::new(10.0, 45.0, 20.0, 55.0);

        assert!(bbox.contains(10.0, 45.0));
        assert!(bbox.contains(20.0, 55.0));
        assert!(bbox.contains(15.0, 50.0));
        assert!(!bbox.contains(9.99, 50.0));
        assert!(!bbox.contains(15.0, 55.01));
    }

    #[test]
    fn derived_areas() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bbox.area_degrees(), 100.0);

        // Centered on the equator, cos(5 deg) is close to 1
        let km2 = bbox.approx_area_km2();
        assert!(km2 > 100_000.0 && km2 < 130_000.0, "{km2}");
    }
}

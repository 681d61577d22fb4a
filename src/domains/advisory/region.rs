//! Supported region and coordinate types.
//!
//! The advisory service only has data for a fixed rectangular area. Every
//! recommendation request is checked against [`SUPPORTED_REGION`] before any
//! upstream call is made.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Valid latitude range on the globe (degrees).
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range on the globe (degrees).
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both axes fall within the absolute globe ranges.
    ///
    /// NaN on either axis is never valid.
    pub fn is_on_globe(&self) -> bool {
        (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&self.latitude)
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Inclusive latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// The area covered by the advisory service.
pub const SUPPORTED_REGION: RegionBounds = RegionBounds {
    min_lat: 3.0,
    max_lat: 15.0,
    min_lon: 32.0,
    max_lon: 48.0,
};

impl RegionBounds {
    /// Returns true when `coord` lies inside the box, edges included.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.latitude)
            && (self.min_lon..=self.max_lon).contains(&coord.longitude)
    }
}

impl fmt::Display for RegionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "latitude {} to {}, longitude {} to {}",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}

/// Is `coord` inside the supported region?
pub fn is_supported(coord: &Coordinate) -> bool {
    SUPPORTED_REGION.contains(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_points_supported() {
        assert!(is_supported(&Coordinate::new(9.145, 38.7617)));
        assert!(is_supported(&Coordinate::new(7.0, 40.0)));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert!(is_supported(&Coordinate::new(3.0, 40.0)));
        assert!(is_supported(&Coordinate::new(15.0, 40.0)));
        assert!(is_supported(&Coordinate::new(9.0, 32.0)));
        assert!(is_supported(&Coordinate::new(9.0, 48.0)));
        assert!(is_supported(&Coordinate::new(3.0, 32.0)));
        assert!(is_supported(&Coordinate::new(15.0, 48.0)));
    }

    #[test]
    fn test_just_outside_each_edge() {
        assert!(!is_supported(&Coordinate::new(2.999, 40.0)));
        assert!(!is_supported(&Coordinate::new(15.001, 40.0)));
        assert!(!is_supported(&Coordinate::new(9.0, 31.999)));
        assert!(!is_supported(&Coordinate::new(9.0, 48.001)));
    }

    #[test]
    fn test_grid_inside_box() {
        let mut lat = 3.0;
        while lat <= 15.0 {
            let mut lon = 32.0;
            while lon <= 48.0 {
                assert!(is_supported(&Coordinate::new(lat, lon)), "{lat},{lon}");
                lon += 0.5;
            }
            lat += 0.5;
        }
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(!is_supported(&Coordinate::new(f64::NAN, 40.0)));
        assert!(!Coordinate::new(f64::NAN, 40.0).is_on_globe());
    }

    #[test]
    fn test_is_on_globe() {
        assert!(Coordinate::new(-90.0, 180.0).is_on_globe());
        assert!(Coordinate::new(90.0, -180.0).is_on_globe());
        assert!(!Coordinate::new(90.5, 0.0).is_on_globe());
        assert!(!Coordinate::new(0.0, -180.1).is_on_globe());
    }

    #[test]
    fn test_bounds_serialize_camel_case() {
        let value = serde_json::to_value(SUPPORTED_REGION).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"minLat": 3.0, "maxLat": 15.0, "minLon": 32.0, "maxLon": 48.0})
        );
    }
}

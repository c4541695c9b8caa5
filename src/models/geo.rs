//! Geographic coordinates and great-circle distance

use haversine::{Location as HaversineLocation, Units, distance as haversine_distance};
use serde::{Deserialize, Serialize};

use crate::{Result, ToolkitError};

/// Mean Earth radius in meters used for all distance computations
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point from latitude and longitude
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Create a validated point from a longitude-first pair, as in "(120.026208, 30.279212)"
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Result<Self> {
        Self::new(latitude, longitude)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ToolkitError::invalid_coordinate(format!(
                "latitude {} must be within [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ToolkitError::invalid_coordinate(format!(
                "longitude {} must be within [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Distance in meters to another point
    pub fn distance_to(&self, other: &GeoPoint) -> Result<f64> {
        distance(self, other)
    }

    /// Format point as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }

    fn ordering_key(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Great-circle distance in meters between two points.
///
/// Points are passed to the haversine formula in a canonical order so the
/// result is identical regardless of argument order.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> Result<f64> {
    a.validate()?;
    b.validate()?;

    let (from, to) = if a.ordering_key() <= b.ordering_key() {
        (a, b)
    } else {
        (b, a)
    };

    let kilometers = haversine_distance(
        HaversineLocation {
            latitude: from.latitude,
            longitude: from.longitude,
        },
        HaversineLocation {
            latitude: to.latitude,
            longitude: to.longitude,
        },
        Units::Kilometers,
    );
    let meters = kilometers * (EARTH_RADIUS_METERS / 6_371.0);

    // Rounding can push the haversine term past 1 for near-antipodal pairs
    if meters.is_finite() {
        Ok(meters)
    } else {
        Ok(std::f64::consts::PI * EARTH_RADIUS_METERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_from_lon_lat_swaps_order() {
        let p = GeoPoint::from_lon_lat(120.026_208, 30.279_212).unwrap();
        assert_eq!(p.latitude, 30.279_212);
        assert_eq!(p.longitude, 120.026_208);
    }

    #[rstest]
    #[case(120.026_208, 30.279_212)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 180.5)]
    #[case(f64::NAN, 0.0)]
    fn test_invalid_coordinates_rejected(#[case] lat: f64, #[case] lon: f64) {
        let result = GeoPoint::new(lat, lon);
        assert!(matches!(result, Err(ToolkitError::InvalidCoordinate { .. })));
    }

    #[rstest]
    #[case(point(30.279_212, 120.026_208), point(30.259_9, 120.130_4))]
    #[case(point(46.818_2, 8.227_5), point(-33.868_8, 151.209_3))]
    #[case(point(89.9, -179.9), point(-89.9, 179.9))]
    #[case(point(0.0, 0.0), point(0.0, 0.0))]
    #[case(point(-82.0, -179.0), point(82.0, 1.0))]
    #[case(point(0.0, 0.0), point(0.0, 180.0))]
    #[case(point(30.279_212, 120.026_208), point(-30.279_212, -59.973_792))]
    fn test_distance_is_symmetric(#[case] a: GeoPoint, #[case] b: GeoPoint) {
        let forward = distance(&a, &b).unwrap();
        let backward = distance(&b, &a).unwrap();
        assert!(forward.is_finite(), "got {forward}");
        assert_eq!(forward, backward);
    }

    #[rstest]
    #[case(point(-82.0, -179.0), point(82.0, 1.0))]
    #[case(point(0.0, 0.0), point(0.0, 180.0))]
    #[case(point(90.0, 0.0), point(-90.0, 0.0))]
    fn test_antipodal_distance_is_half_circumference(#[case] a: GeoPoint, #[case] b: GeoPoint) {
        let d = distance(&a, &b).unwrap();
        let half = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - half).abs() < 1.0, "got {d}");
    }

    #[rstest]
    #[case(point(30.279_212, 120.026_208))]
    #[case(point(-45.0, -170.0))]
    #[case(point(90.0, 180.0))]
    fn test_distance_to_self_is_zero(#[case] a: GeoPoint) {
        assert_eq!(distance(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_known_value() {
        // One degree of latitude along a meridian
        let d = distance(&point(0.0, 0.0), &point(1.0, 0.0)).unwrap();
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_distance_rejects_invalid_point() {
        let bad = GeoPoint {
            latitude: 120.0,
            longitude: 30.0,
        };
        let result = distance(&point(0.0, 0.0), &bad);
        assert!(matches!(result, Err(ToolkitError::InvalidCoordinate { .. })));
    }
}

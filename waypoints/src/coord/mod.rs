//! Geographic coordinates and distance calculation.
//!
//! Provides the `Coordinate` value type used throughout the pipeline and the
//! great-circle distance used by the distance-threshold update policy.

use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius in meters, used for great-circle distance.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors from coordinate construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside [-90, 90].
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),
}

/// A geographic coordinate in floating-point degrees.
///
/// Immutable once constructed. Produced by position sources and carried
/// through the pipeline unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, validating both components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to another coordinate in meters (haversine).
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let coord = Coordinate::new(25.7877, -80.2241).unwrap();
        assert_eq!(coord.latitude, 25.7877);
        assert_eq!(coord.longitude, -80.2241);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = Coordinate::new(90.5, 0.0);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = Coordinate::new(0.0, -180.5);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let coord = Coordinate::new(53.5511, 9.9937).unwrap();
        assert_eq!(coord.distance_meters(&coord), 0.0);
    }

    #[test]
    fn test_distance_hamburg_to_toulouse() {
        // Hamburg to Toulouse is roughly 1,270 km great-circle
        let hamburg = Coordinate::new(53.5511, 9.9937).unwrap();
        let toulouse = Coordinate::new(43.6047, 1.4442).unwrap();

        let distance = hamburg.distance_meters(&toulouse);
        assert!(
            (distance - 1_270_000.0).abs() < 15_000.0,
            "Expected ~1270km, got {}m",
            distance
        );
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is roughly 111 km everywhere
        let a = Coordinate::new(40.0, -74.0).unwrap();
        let b = Coordinate::new(41.0, -74.0).unwrap();

        let distance = a.distance_meters(&b);
        assert!(
            (distance - 111_000.0).abs() < 2_000.0,
            "Expected ~111km, got {}m",
            distance
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_distance_symmetric(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64
            ) {
                let a = Coordinate::new(lat1, lon1).unwrap();
                let b = Coordinate::new(lat2, lon2).unwrap();

                let ab = a.distance_meters(&b);
                let ba = b.distance_meters(&a);

                prop_assert!(
                    (ab - ba).abs() < 1e-6,
                    "Distance not symmetric: {} vs {}",
                    ab, ba
                );
            }

            #[test]
            fn test_distance_non_negative(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64
            ) {
                let a = Coordinate::new(lat1, lon1).unwrap();
                let b = Coordinate::new(lat2, lon2).unwrap();

                prop_assert!(a.distance_meters(&b) >= 0.0);
            }

            #[test]
            fn test_distance_bounded_by_half_circumference(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64
            ) {
                let a = Coordinate::new(lat1, lon1).unwrap();
                let b = Coordinate::new(lat2, lon2).unwrap();

                // No two points are farther apart than half the circumference
                let max = std::f64::consts::PI * 6_371_000.0;
                prop_assert!(a.distance_meters(&b) <= max + 1.0);
            }

            #[test]
            fn test_reject_out_of_range_latitude(
                lat in 90.001..1000.0_f64,
                lon in -180.0..180.0_f64
            ) {
                prop_assert!(matches!(
                    Coordinate::new(lat, lon),
                    Err(CoordError::InvalidLatitude(_))
                ));
            }
        }
    }
}

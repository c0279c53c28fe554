//! The outcome model for the location pipeline.
//!
//! Defines the values flowing through the resolution pipeline: raw position
//! fixes on the way in, resolved `Location` values (or failures) on the way
//! out. A `LocationOutcome` is the unit delivered to every subscriber.
//!
//! # Equality
//!
//! `Location` equality is defined solely by the physical coordinate. Two
//! locations at the same coordinate are equal regardless of how their
//! city/state strings were resolved. This supports distance-based
//! deduplication: the policy compares positions, not geocoder output.

use std::time::Instant;

use crate::coord::Coordinate;
use crate::provider::{GeocodeError, PositionError};

/// A single raw position sample from a positioning provider.
///
/// Ephemeral: consumed by the filtering policy and the geocode step, never
/// stored beyond that.
#[derive(Debug, Clone, Copy)]
pub struct RawFix {
    /// The sampled position.
    pub coordinate: Coordinate,
    /// When the provider produced this sample.
    pub timestamp: Instant,
    /// Provider-reported horizontal accuracy in meters, if known.
    pub horizontal_accuracy_meters: Option<f64>,
}

impl RawFix {
    /// Create a fix for a coordinate, timestamped now.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            timestamp: Instant::now(),
            horizontal_accuracy_meters: None,
        }
    }

    /// Set the provider-reported horizontal accuracy.
    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.horizontal_accuracy_meters = Some(meters);
        self
    }
}

/// A reverse-geocoding candidate for a coordinate.
///
/// All fields are optional because a lookup may resolve only partially. The
/// pipeline requires city and state to build a `Location`; a candidate
/// missing either is treated as an unknown location, not a transport error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceCandidate {
    /// Resolved city, if any.
    pub city: Option<String>,
    /// Resolved state or administrative area, if any.
    pub state: Option<String>,
    /// Resolved neighborhood, if any.
    pub neighborhood: Option<String>,
}

impl PlaceCandidate {
    /// Create an empty candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the city.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the state.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set the neighborhood.
    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }
}

/// A resolved location: a physical coordinate plus place metadata.
///
/// Immutable once constructed. City and state are always present; the
/// neighborhood is carried when the geocoder supplied one.
#[derive(Debug, Clone)]
pub struct Location {
    /// The physical position this location was resolved from.
    pub physical: Coordinate,
    /// The city the location is in.
    pub city: String,
    /// The state the location is in.
    pub state: String,
    /// The neighborhood the location is in, if resolved.
    pub neighborhood: Option<String>,
}

impl Location {
    /// Build a location from a coordinate and a geocoding candidate.
    ///
    /// Returns `None` when the candidate is missing city or state; the
    /// pipeline publishes such results as `LocationFailure::Unknown`.
    pub fn from_candidate(physical: Coordinate, candidate: &PlaceCandidate) -> Option<Self> {
        let city = candidate.city.clone()?;
        let state = candidate.state.clone()?;

        Some(Self {
            physical,
            city,
            state,
            neighborhood: candidate.neighborhood.clone(),
        })
    }
}

// Equality by physical position only; see module docs.
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.physical == other.physical
    }
}

/// An upstream provider error carried through the pipeline unmodified.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// The positioning provider reported an error.
    Position(PositionError),
    /// The reverse-geocoding provider reported an error.
    Geocode(GeocodeError),
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Position(e) => write!(f, "position provider: {}", e),
            UpstreamError::Geocode(e) => write!(f, "geocoder: {}", e),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Position(e) => Some(e),
            UpstreamError::Geocode(e) => Some(e),
        }
    }
}

/// Why no location could be determined.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationFailure {
    /// No fix yet, an empty fix list, or a candidate that could not be used.
    Unknown,
    /// A transport-level error from an upstream provider.
    Upstream(UpstreamError),
}

/// The unit delivered to subscribers: a resolved location or a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    /// A location was resolved.
    Resolved(Location),
    /// No location could be determined.
    Failed(LocationFailure),
}

impl LocationOutcome {
    /// The initial outcome before anything has been published.
    pub fn unknown() -> Self {
        LocationOutcome::Failed(LocationFailure::Unknown)
    }

    /// Whether this outcome carries a resolved location.
    pub fn is_resolved(&self) -> bool {
        matches!(self, LocationOutcome::Resolved(_))
    }

    /// The resolved location, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            LocationOutcome::Resolved(location) => Some(location),
            LocationOutcome::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miami() -> Coordinate {
        Coordinate::new(25.7877, -80.2241).unwrap()
    }

    #[test]
    fn test_location_equality_by_coordinate_only() {
        let a = Location {
            physical: miami(),
            city: "Miami".to_string(),
            state: "FL".to_string(),
            neighborhood: None,
        };
        let b = Location {
            physical: miami(),
            city: "Somewhere Else".to_string(),
            state: "XX".to_string(),
            neighborhood: Some("Wynwood".to_string()),
        };

        assert_eq!(a, b);
    }

    #[test]
    fn test_location_inequality_by_coordinate() {
        let a = Location {
            physical: miami(),
            city: "Miami".to_string(),
            state: "FL".to_string(),
            neighborhood: None,
        };
        let b = Location {
            physical: Coordinate::new(40.7128, -74.0060).unwrap(),
            city: "Miami".to_string(),
            state: "FL".to_string(),
            neighborhood: None,
        };

        assert_ne!(a, b);
    }

    #[test]
    fn test_from_candidate_complete() {
        let candidate = PlaceCandidate::new()
            .with_city("Miami")
            .with_state("FL")
            .with_neighborhood("Wynwood");

        let location = Location::from_candidate(miami(), &candidate).unwrap();
        assert_eq!(location.city, "Miami");
        assert_eq!(location.state, "FL");
        assert_eq!(location.neighborhood.as_deref(), Some("Wynwood"));
    }

    #[test]
    fn test_from_candidate_without_neighborhood() {
        let candidate = PlaceCandidate::new().with_city("Miami").with_state("FL");

        let location = Location::from_candidate(miami(), &candidate).unwrap();
        assert!(location.neighborhood.is_none());
    }

    #[test]
    fn test_from_candidate_missing_city() {
        let candidate = PlaceCandidate::new().with_state("FL");
        assert!(Location::from_candidate(miami(), &candidate).is_none());
    }

    #[test]
    fn test_from_candidate_missing_state() {
        let candidate = PlaceCandidate::new().with_city("Miami");
        assert!(Location::from_candidate(miami(), &candidate).is_none());
    }

    #[test]
    fn test_initial_outcome_is_unknown() {
        let outcome = LocationOutcome::unknown();
        assert!(!outcome.is_resolved());
        assert_eq!(
            outcome,
            LocationOutcome::Failed(LocationFailure::Unknown)
        );
    }

    #[test]
    fn test_outcome_location_accessor() {
        let location = Location {
            physical: miami(),
            city: "Miami".to_string(),
            state: "FL".to_string(),
            neighborhood: None,
        };
        let outcome = LocationOutcome::Resolved(location);

        assert!(outcome.is_resolved());
        assert_eq!(outcome.location().unwrap().city, "Miami");
        assert!(LocationOutcome::unknown().location().is_none());
    }

    #[test]
    fn test_raw_fix_accuracy() {
        let fix = RawFix::new(miami()).with_accuracy(12.5);
        assert_eq!(fix.horizontal_accuracy_meters, Some(12.5));
    }
}

//! Table-driven geocoder for tests and demos.
//!
//! `FixedGeocoder` resolves a coordinate to the nearest configured entry
//! within a match radius. Lookups outside the radius resolve to an empty
//! candidate list, which the pipeline treats as an unknown location. A
//! failure can be steered in to exercise the upstream error path, and an
//! artificial latency can be configured to exercise overlapping resolutions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::coord::Coordinate;
use crate::location::PlaceCandidate;

use super::traits::{GeocodeError, Geocoder};

/// Default radius within which a table entry matches a lookup.
const DEFAULT_MATCH_RADIUS_METERS: f64 = 10_000.0;

/// A geocoder backed by a fixed coordinate-to-place table.
///
/// # Usage
///
/// ```ignore
/// let geocoder = FixedGeocoder::new()
///     .with_entry(miami, PlaceCandidate::new().with_city("Miami").with_state("FL"));
///
/// // Steer the next resolutions into failure:
/// geocoder.set_failure(Some(GeocodeError::Unavailable));
/// ```
pub struct FixedGeocoder {
    entries: Vec<(Coordinate, PlaceCandidate)>,
    match_radius_meters: f64,
    latency: Option<Duration>,
    failure: Arc<Mutex<Option<GeocodeError>>>,
}

impl Default for FixedGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedGeocoder {
    /// Create an empty geocoder. All lookups resolve to no candidates.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            match_radius_meters: DEFAULT_MATCH_RADIUS_METERS,
            latency: None,
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Add a table entry.
    pub fn with_entry(mut self, coordinate: Coordinate, candidate: PlaceCandidate) -> Self {
        self.entries.push((coordinate, candidate));
        self
    }

    /// Set the radius within which an entry matches a lookup.
    pub fn with_match_radius(mut self, meters: f64) -> Self {
        self.match_radius_meters = meters;
        self
    }

    /// Delay every resolution by the given duration.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// While set, every resolution fails with a clone of this error.
    pub fn set_failure(&self, failure: Option<GeocodeError>) {
        *self.failure.lock().unwrap() = failure;
    }

    fn lookup(&self, coordinate: Coordinate) -> Vec<PlaceCandidate> {
        let mut best: Option<(f64, &PlaceCandidate)> = None;
        for (entry_coord, candidate) in &self.entries {
            let distance = coordinate.distance_meters(entry_coord);
            if distance > self.match_radius_meters {
                continue;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }

        match best {
            Some((_, candidate)) => vec![candidate.clone()],
            None => Vec::new(),
        }
    }
}

impl Geocoder for FixedGeocoder {
    fn resolve(
        &self,
        coordinate: Coordinate,
    ) -> BoxFuture<'static, Result<Vec<PlaceCandidate>, GeocodeError>> {
        let failure = self.failure.lock().unwrap().clone();
        let result = match failure {
            Some(error) => Err(error),
            None => Ok(self.lookup(coordinate)),
        };
        let latency = self.latency;

        Box::pin(async move {
            if let Some(delay) = latency {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

//! Waypoints - reactive location tracking
//!
//! This library wraps a positioning provider and a reverse-geocoding provider
//! behind a single observable stream of resolved, human-readable locations
//! (city/state). Raw position fixes are filtered by a configurable update
//! policy, resolved through an asynchronous geocoder, and delivered to every
//! subscriber in publication order.
//!
//! # Architecture
//!
//! - [`coord`] - geographic coordinates and great-circle distance
//! - [`location`] - the outcome model: `Location`, `LocationOutcome`, failures
//! - [`provider`] - capability interfaces for positioning, geocoding, and
//!   application lifecycle, plus deterministic implementations
//! - [`registry`] - synchronous callback fan-out for legacy-style observers
//! - [`tracker`] - the resolution pipeline: `LocationTracker`
//! - [`logging`] - optional tracing subscriber initialization
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use waypoints::provider::{AlwaysActive, FixedGeocoder, ScriptedPositionSource};
//! use waypoints::tracker::{LocationTracker, TrackerConfig};
//!
//! let source = Arc::new(ScriptedPositionSource::new());
//! let geocoder = Arc::new(FixedGeocoder::new());
//! let lifecycle = Arc::new(AlwaysActive::new());
//!
//! let tracker = LocationTracker::start(source, geocoder, lifecycle, TrackerConfig::default());
//! let mut updates = tracker.subscribe();
//!
//! while let Ok(outcome) = updates.recv().await {
//!     // Handle resolved location or failure
//! }
//! ```

pub mod coord;
pub mod location;
pub mod logging;
pub mod provider;
pub mod registry;
pub mod tracker;

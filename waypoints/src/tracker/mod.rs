//! The location resolution pipeline.
//!
//! `LocationTracker` composes the three provider interfaces into one
//! continuous, cancellable stream of [`LocationOutcome`] values. Raw fixes
//! are filtered by the configured update policy, accepted fixes are resolved
//! through the geocoder, and every outcome is delivered to all subscribers
//! in publication order.
//!
//! # Architecture
//!
//! ```text
//! LifecycleSource ──events──► ┌─────────────────┐
//! PositionSource ──fixes────► │   event loop    │──► broadcast subscribers
//!        ▲  start/stop        │  (single writer) │──► observer callbacks
//!        └────────────────────│                  │──► last outcome
//! Geocoder ◄──resolve──────── └─────────────────┘
//! ```
//!
//! # States
//!
//! A tracker starts **Active** (the position source is started on
//! construction). A `WillResignActive` lifecycle event suspends it, stopping
//! the source; `DidBecomeActive` resumes it. Dropping the handle or calling
//! `shutdown` terminates the pipeline: provider subscriptions are dropped,
//! the source is stopped, and geocode calls still in flight are discarded.
//!
//! # Ordering
//!
//! All publications for one tracker are serialized by its event loop; every
//! subscriber sees outcomes in the same order. Overlapping geocode calls are
//! not serialized against each other: when a second fix is accepted before
//! the first resolution completes, outcomes publish in completion order.
//!
//! [`LocationOutcome`]: crate::location::LocationOutcome

mod config;
mod policy;
#[allow(clippy::module_inception)]
mod tracker;

pub use config::{
    TrackerConfig, UpdatePolicy, DEFAULT_CHANNEL_CAPACITY, DEFAULT_DISTANCE_THRESHOLD_METERS,
    DEFAULT_UPDATE_INTERVAL,
};
pub use tracker::LocationTracker;

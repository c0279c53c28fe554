//! Core traits for positioning, geocoding, and lifecycle providers.
//!
//! # Design Principles
//!
//! - **Minimal interfaces**: only the operations the pipeline consumes
//! - **Push delivery**: providers emit into broadcast channels; the pipeline
//!   subscribes once and serializes everything onto its own event loop
//! - **Errors as values**: provider failures travel the same channel as data
//! - **Dyn-compatible async**: geocoding returns a boxed future so providers
//!   can be held as trait objects

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::coord::Coordinate;
use crate::location::{PlaceCandidate, RawFix};

/// Errors from a positioning provider.
///
/// Passed through the pipeline unmodified as an upstream failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    /// The provider reported an error delivering fixes.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The user denied location access.
    #[error("Location access denied")]
    AccessDenied,
}

/// Errors from a reverse-geocoding provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// The geocoding service reported an error.
    #[error("Geocoding service error: {0}")]
    Service(String),

    /// The geocoding service is unreachable.
    #[error("Geocoding service unavailable")]
    Unavailable,
}

/// Authorization state of the positioning provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// The user has not yet been asked.
    NotDetermined,
    /// The user declined access.
    Denied,
    /// Access granted.
    Granted,
}

/// One event from a positioning provider.
#[derive(Debug, Clone)]
pub enum PositionEvent {
    /// A batch of fixes from the provider. The pipeline uses only the first
    /// entry; an empty batch means the provider has lost the position.
    Fixes(Vec<RawFix>),

    /// A transport-level provider error.
    Failed(PositionError),

    /// The provider's authorization status changed.
    Authorization(AuthorizationStatus),
}

/// A positioning provider (pull control, push data).
///
/// `start` and `stop` are idempotent; a stopped source can be started again.
/// Implementations emit [`PositionEvent`]s to all current subscribers while
/// started, and should emit an `Authorization` event when `start` is called
/// without access having been granted.
pub trait PositionSource: Send + Sync {
    /// Begin emitting position fixes.
    fn start(&self);

    /// Cease emitting position fixes. May be resumed with `start`.
    fn stop(&self);

    /// Ask the platform for location access. Fire-and-forget; the answer
    /// arrives as an `Authorization` event.
    fn request_authorization(&self);

    /// Subscribe to the provider's event stream.
    fn subscribe(&self) -> broadcast::Receiver<PositionEvent>;
}

/// A reverse-geocoding provider.
///
/// Resolves one coordinate to zero or more place candidates. At most one
/// resolution is started per fix accepted by the update policy; resolutions
/// are not cancelled by newer fixes.
pub trait Geocoder: Send + Sync {
    /// Resolve a coordinate to place candidates.
    fn resolve(
        &self,
        coordinate: Coordinate,
    ) -> BoxFuture<'static, Result<Vec<PlaceCandidate>, GeocodeError>>;
}

/// A host application lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The application is about to leave the foreground.
    WillResignActive,
    /// The application returned to the foreground.
    DidBecomeActive,
}

/// A source of host application lifecycle events.
///
/// On platforms without a foreground/background notion, use [`AlwaysActive`],
/// which never emits.
///
/// [`AlwaysActive`]: super::AlwaysActive
pub trait LifecycleSource: Send + Sync {
    /// Subscribe to lifecycle transitions.
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent>;
}

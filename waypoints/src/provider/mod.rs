//! Capability interfaces for the pipeline's external collaborators.
//!
//! The pipeline depends on three narrow interfaces rather than on any
//! platform SDK directly:
//!
//! - [`PositionSource`] - start/stop position updates, request authorization,
//!   subscribe to a stream of fix batches, errors, and authorization changes
//! - [`Geocoder`] - resolve one coordinate to place candidates, asynchronously
//! - [`LifecycleSource`] - subscribe to foreground/background transitions
//!
//! Host integrations implement these traits over the platform's services.
//! The crate ships deterministic implementations used by tests and demos:
//! [`ScriptedPositionSource`], [`FixedGeocoder`], [`LifecycleHub`], and the
//! no-op [`AlwaysActive`] for platforms without a foreground notion.

mod geocoder;
mod lifecycle;
mod scripted;
mod traits;

pub use geocoder::FixedGeocoder;
pub use lifecycle::{AlwaysActive, LifecycleHub};
pub use scripted::ScriptedPositionSource;
pub use traits::{
    AuthorizationStatus, GeocodeError, Geocoder, LifecycleEvent, LifecycleSource, PositionError,
    PositionEvent, PositionSource,
};

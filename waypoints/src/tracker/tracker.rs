//! The location tracker: event loop and public handle.

use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::location::{
    Location, LocationFailure, LocationOutcome, PlaceCandidate, RawFix, UpstreamError,
};
use crate::provider::{
    AuthorizationStatus, GeocodeError, Geocoder, LifecycleEvent, LifecycleSource, PositionEvent,
    PositionSource,
};
use crate::registry::{ObserverId, ObserverRegistry};

use super::config::{TrackerConfig, UpdatePolicy};
use super::policy::{distance_accepts, ThrottleState};

/// A completed reverse-geocoding call, delivered back onto the event loop.
struct GeocodeCompletion {
    fix: RawFix,
    result: Result<Vec<PlaceCandidate>, GeocodeError>,
}

/// Whether the pipeline is currently receiving fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Active,
    Suspended,
}

enum PolicyState {
    Distance { threshold_meters: f64 },
    Throttle(ThrottleState),
}

impl PolicyState {
    fn from_config(policy: UpdatePolicy) -> Self {
        match policy {
            UpdatePolicy::DistanceThreshold { meters } => PolicyState::Distance {
                threshold_meters: meters,
            },
            UpdatePolicy::IntervalThrottle { interval } => {
                PolicyState::Throttle(ThrottleState::new(interval))
            }
        }
    }
}

/// Handle to a running location tracker.
///
/// Dropping the handle cancels the pipeline; [`shutdown`] additionally waits
/// for the event loop to finish.
///
/// [`shutdown`]: LocationTracker::shutdown
pub struct LocationTracker {
    outcomes_tx: broadcast::Sender<LocationOutcome>,
    last_outcome: Arc<RwLock<LocationOutcome>>,
    observers: Arc<ObserverRegistry<LocationOutcome>>,
    cancellation: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LocationTracker {
    /// Start tracking: subscribe to the providers, start the position
    /// source, and spawn the event loop.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(
        source: Arc<dyn PositionSource>,
        geocoder: Arc<dyn Geocoder>,
        lifecycle: Arc<dyn LifecycleSource>,
        config: TrackerConfig,
    ) -> Self {
        let (outcomes_tx, _) = broadcast::channel(config.channel_capacity);
        let last_outcome = Arc::new(RwLock::new(LocationOutcome::unknown()));
        let observers = Arc::new(ObserverRegistry::new());
        let cancellation = CancellationToken::new();
        let (geocode_tx, geocode_rx) = mpsc::unbounded_channel();

        // Subscribe before starting the source so no event is missed
        let position_rx = source.subscribe();
        let lifecycle_rx = lifecycle.subscribe();

        let event_loop = TrackerLoop {
            source: Arc::clone(&source),
            geocoder,
            outcomes_tx: outcomes_tx.clone(),
            observers: Arc::clone(&observers),
            last_outcome: Arc::clone(&last_outcome),
            geocode_tx,
            policy: PolicyState::from_config(config.policy),
            activity: Activity::Active,
        };

        info!(policy = ?config.policy, "Starting location tracker");
        source.start();

        let task = tokio::spawn(event_loop.run(
            position_rx,
            lifecycle_rx,
            geocode_rx,
            cancellation.clone(),
        ));

        Self {
            outcomes_tx,
            last_outcome,
            observers,
            cancellation,
            task: Some(task),
        }
    }

    /// Subscribe to the outcome stream.
    ///
    /// A subscriber receives every outcome published after it subscribes,
    /// in publication order.
    pub fn subscribe(&self) -> broadcast::Receiver<LocationOutcome> {
        self.outcomes_tx.subscribe()
    }

    /// Register a callback invoked synchronously on every publication, in
    /// registration order.
    pub fn add_observer(
        &self,
        observer: impl Fn(&LocationOutcome) + Send + 'static,
    ) -> ObserverId {
        self.observers.add(Box::new(observer))
    }

    /// Remove a previously registered observer.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// The most recently published outcome. `Failed(Unknown)` until the
    /// first publication.
    pub fn current_outcome(&self) -> LocationOutcome {
        self.last_outcome.read().unwrap().clone()
    }

    /// Stop the pipeline and wait for the event loop to finish.
    ///
    /// The position source is stopped, provider subscriptions are dropped,
    /// and geocode calls still in flight are discarded.
    pub async fn shutdown(mut self) {
        self.cancellation.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// The single-writer event loop.
///
/// All publications for one tracker pass through this loop, which serializes
/// position events, lifecycle events, geocode completions, and throttle
/// deadlines onto one sequence.
struct TrackerLoop {
    source: Arc<dyn PositionSource>,
    geocoder: Arc<dyn Geocoder>,
    outcomes_tx: broadcast::Sender<LocationOutcome>,
    observers: Arc<ObserverRegistry<LocationOutcome>>,
    last_outcome: Arc<RwLock<LocationOutcome>>,
    geocode_tx: mpsc::UnboundedSender<GeocodeCompletion>,
    policy: PolicyState,
    activity: Activity,
}

impl TrackerLoop {
    async fn run(
        mut self,
        mut position_rx: broadcast::Receiver<PositionEvent>,
        mut lifecycle_rx: broadcast::Receiver<LifecycleEvent>,
        mut geocode_rx: mpsc::UnboundedReceiver<GeocodeCompletion>,
        cancellation: CancellationToken,
    ) {
        let mut position_open = true;
        let mut lifecycle_open = true;

        loop {
            let throttle_deadline = self.throttle_deadline();

            tokio::select! {
                biased;

                _ = cancellation.cancelled() => break,

                event = position_rx.recv(), if position_open => match event {
                    Ok(event) => self.handle_position_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Position events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("Position source closed its event stream");
                        position_open = false;
                    }
                },

                event = lifecycle_rx.recv(), if lifecycle_open => match event {
                    Ok(event) => self.handle_lifecycle_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Lifecycle events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        lifecycle_open = false;
                    }
                },

                completion = geocode_rx.recv() => match completion {
                    Some(completion) => self.handle_geocode_completion(completion),
                    None => break,
                },

                _ = tokio::time::sleep_until(
                    throttle_deadline.unwrap_or_else(Instant::now)
                ), if throttle_deadline.is_some() => {
                    self.handle_throttle_deadline();
                }
            }
        }

        self.source.stop();
        debug!("Location tracker event loop terminated");
    }

    fn throttle_deadline(&self) -> Option<Instant> {
        match &self.policy {
            PolicyState::Distance { .. } => None,
            PolicyState::Throttle(throttle) => throttle.deadline(),
        }
    }

    fn handle_position_event(&mut self, event: PositionEvent) {
        match event {
            PositionEvent::Fixes(fixes) => self.handle_fixes(fixes),
            PositionEvent::Failed(error) => {
                // Transport failures bypass the update policy
                self.publish(LocationOutcome::Failed(LocationFailure::Upstream(
                    UpstreamError::Position(error),
                )));
            }
            PositionEvent::Authorization(status) => self.handle_authorization(status),
        }
    }

    fn handle_fixes(&mut self, fixes: Vec<RawFix>) {
        let Some(fix) = fixes.first().copied() else {
            // An empty batch publishes immediately under either policy
            self.publish(LocationOutcome::Failed(LocationFailure::Unknown));
            return;
        };

        let accepted = match &mut self.policy {
            PolicyState::Distance { threshold_meters } => {
                let last = self.last_outcome.read().unwrap();
                if distance_accepts(&last, &fix, *threshold_meters) {
                    Some(fix)
                } else {
                    debug!(
                        latitude = fix.coordinate.latitude,
                        longitude = fix.coordinate.longitude,
                        "Fix dropped below distance threshold"
                    );
                    None
                }
            }
            PolicyState::Throttle(throttle) => throttle.offer(fix, Instant::now()),
        };

        if let Some(fix) = accepted {
            self.begin_geocode(fix);
        }
    }

    fn handle_authorization(&mut self, status: AuthorizationStatus) {
        match status {
            AuthorizationStatus::Granted => {
                debug!("Location access granted, starting updates");
                self.source.start();
            }
            other => {
                debug!(status = ?other, "Location access not granted, requesting");
                self.source.request_authorization();
            }
        }
    }

    fn handle_lifecycle_event(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::WillResignActive => {
                if self.activity == Activity::Active {
                    info!("Application resigning active, suspending updates");
                    self.source.stop();
                    self.activity = Activity::Suspended;
                }
            }
            LifecycleEvent::DidBecomeActive => {
                if self.activity == Activity::Suspended {
                    info!("Application became active, resuming updates");
                    self.source.start();
                    self.activity = Activity::Active;
                }
            }
        }
    }

    fn handle_throttle_deadline(&mut self) {
        if let PolicyState::Throttle(throttle) = &mut self.policy {
            if let Some(fix) = throttle.expire(Instant::now()) {
                self.begin_geocode(fix);
            }
        }
    }

    /// Start one geocode call for an accepted fix.
    ///
    /// Calls are not serialized against each other: a second fix accepted
    /// before the first resolution completes starts a second call, and
    /// completions publish in completion order.
    fn begin_geocode(&self, fix: RawFix) {
        let resolution = self.geocoder.resolve(fix.coordinate);
        let completions = self.geocode_tx.clone();

        tokio::spawn(async move {
            let result = resolution.await;
            // Delivery fails only after the loop has terminated; the
            // completion is discarded, never published
            let _ = completions.send(GeocodeCompletion { fix, result });
        });
    }

    fn handle_geocode_completion(&mut self, completion: GeocodeCompletion) {
        let outcome = match completion.result {
            Ok(candidates) => match candidates
                .first()
                .and_then(|candidate| Location::from_candidate(completion.fix.coordinate, candidate))
            {
                Some(location) => LocationOutcome::Resolved(location),
                None => LocationOutcome::Failed(LocationFailure::Unknown),
            },
            Err(error) => LocationOutcome::Failed(LocationFailure::Upstream(
                UpstreamError::Geocode(error),
            )),
        };

        self.publish(outcome);
    }

    /// Deliver an outcome to every subscriber, then record it as the last
    /// outcome.
    fn publish(&mut self, outcome: LocationOutcome) {
        match &outcome {
            LocationOutcome::Resolved(location) => {
                info!(
                    latitude = location.physical.latitude,
                    longitude = location.physical.longitude,
                    city = %location.city,
                    state = %location.state,
                    "Publishing resolved location"
                );
            }
            LocationOutcome::Failed(failure) => {
                debug!(failure = ?failure, "Publishing location failure");
            }
        }

        let _ = self.outcomes_tx.send(outcome.clone());
        self.observers.notify(&outcome);
        *self.last_outcome.write().unwrap() = outcome;
    }
}

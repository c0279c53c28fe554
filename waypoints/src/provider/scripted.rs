//! Deterministic position source for tests and demos.
//!
//! `ScriptedPositionSource` implements [`PositionSource`] without touching
//! any platform service. It can replay a scripted route at a fixed cadence
//! while started, and every event kind can also be steered in directly. It
//! counts `start`/`stop` calls so tests can assert the pipeline's lifecycle
//! behavior, and it models the platform authorization handshake: starting
//! without access emits the current status, and `request_authorization`
//! resolves it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::coord::Coordinate;
use crate::location::RawFix;

use super::traits::{AuthorizationStatus, PositionError, PositionEvent, PositionSource};

/// Default cadence for scripted fix emission.
const DEFAULT_CADENCE: Duration = Duration::from_secs(1);

/// Capacity of the provider event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

struct Inner {
    /// Current authorization status.
    authorization: AuthorizationStatus,
    /// Cancellation token for the emission task while started.
    running: Option<CancellationToken>,
}

/// A position source that replays a scripted route.
///
/// # Usage
///
/// ```ignore
/// let source = ScriptedPositionSource::new()
///     .with_script(vec![hamburg, toulouse], Duration::from_secs(1));
///
/// let mut events = source.subscribe();
/// source.start();
///
/// // Or steer events in directly:
/// source.publish_fix(hamburg);
/// source.publish_error(PositionError::Provider("gps lost".into()));
/// ```
pub struct ScriptedPositionSource {
    events_tx: broadcast::Sender<PositionEvent>,
    script: Vec<Coordinate>,
    cadence: Duration,
    /// Whether `request_authorization` grants access (false simulates denial).
    request_grants: bool,
    inner: Mutex<Inner>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl Default for ScriptedPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedPositionSource {
    /// Create a source with no script, authorization already granted.
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            events_tx,
            script: Vec::new(),
            cadence: DEFAULT_CADENCE,
            request_grants: true,
            inner: Mutex::new(Inner {
                authorization: AuthorizationStatus::Granted,
                running: None,
            }),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Set a route to replay at the given cadence while started.
    ///
    /// The script cycles: after the last coordinate it starts over.
    pub fn with_script(mut self, script: Vec<Coordinate>, cadence: Duration) -> Self {
        self.script = script;
        self.cadence = cadence;
        self
    }

    /// Set the initial authorization status.
    pub fn with_authorization(self, status: AuthorizationStatus) -> Self {
        self.inner.lock().unwrap().authorization = status;
        self
    }

    /// Make `request_authorization` resolve to `Denied` instead of `Granted`.
    pub fn deny_authorization_requests(mut self) -> Self {
        self.request_grants = false;
        self
    }

    /// Number of times `start` has been called.
    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Number of times `stop` has been called.
    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Whether the source is currently emitting.
    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().running.is_some()
    }

    /// Current authorization status.
    pub fn authorization(&self) -> AuthorizationStatus {
        self.inner.lock().unwrap().authorization
    }

    /// Steer a single fix to all subscribers.
    pub fn publish_fix(&self, coordinate: Coordinate) {
        self.publish_fixes(vec![RawFix::new(coordinate)]);
    }

    /// Steer a batch of fixes to all subscribers.
    pub fn publish_fixes(&self, fixes: Vec<RawFix>) {
        let _ = self.events_tx.send(PositionEvent::Fixes(fixes));
    }

    /// Steer an empty fix batch (provider lost the position).
    pub fn publish_empty(&self) {
        let _ = self.events_tx.send(PositionEvent::Fixes(Vec::new()));
    }

    /// Steer a provider error to all subscribers.
    pub fn publish_error(&self, error: PositionError) {
        let _ = self.events_tx.send(PositionEvent::Failed(error));
    }

    fn spawn_emitter(&self, cancel: CancellationToken) {
        let tx = self.events_tx.clone();
        let script = self.script.clone();
        let cadence = self.cadence;

        tokio::spawn(async move {
            let mut index = 0usize;
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(cadence) => {}
                }
                let coordinate = script[index % script.len()];
                index += 1;
                if tx
                    .send(PositionEvent::Fixes(vec![RawFix::new(coordinate)]))
                    .is_err()
                {
                    // No subscribers remain
                    break;
                }
            }
        });
    }
}

impl PositionSource for ScriptedPositionSource {
    fn start(&self) {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().unwrap();
        if inner.authorization != AuthorizationStatus::Granted {
            let status = inner.authorization;
            drop(inner);
            tracing::debug!(?status, "start requested without authorization");
            let _ = self.events_tx.send(PositionEvent::Authorization(status));
            return;
        }

        if inner.running.is_some() {
            return;
        }

        let token = CancellationToken::new();
        if !self.script.is_empty() {
            self.spawn_emitter(token.clone());
        }
        inner.running = Some(token);
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().unwrap();
        if let Some(token) = inner.running.take() {
            token.cancel();
        }
    }

    fn request_authorization(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.authorization != AuthorizationStatus::NotDetermined {
            // Already determined; the platform would not prompt again
            return;
        }

        let status = if self.request_grants {
            AuthorizationStatus::Granted
        } else {
            AuthorizationStatus::Denied
        };
        inner.authorization = status;
        drop(inner);

        tracing::debug!(?status, "authorization request resolved");
        let _ = self.events_tx.send(PositionEvent::Authorization(status));
    }

    fn subscribe(&self) -> broadcast::Receiver<PositionEvent> {
        self.events_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hamburg() -> Coordinate {
        Coordinate::new(53.5511, 9.9937).unwrap()
    }

    #[tokio::test]
    async fn test_steered_fix_reaches_subscriber() {
        let source = ScriptedPositionSource::new();
        let mut rx = source.subscribe();

        source.publish_fix(hamburg());

        let event = rx.recv().await.unwrap();
        match event {
            PositionEvent::Fixes(fixes) => {
                assert_eq!(fixes.len(), 1);
                assert_eq!(fixes[0].coordinate, hamburg());
            }
            other => panic!("Expected fixes, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_stop_counts() {
        let source = ScriptedPositionSource::new();

        source.start();
        assert!(source.is_running());
        source.start();
        source.stop();
        assert!(!source.is_running());

        assert_eq!(source.start_count(), 2);
        assert_eq!(source.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_start_without_authorization_emits_status() {
        let source =
            ScriptedPositionSource::new().with_authorization(AuthorizationStatus::NotDetermined);
        let mut rx = source.subscribe();

        source.start();
        assert!(!source.is_running());

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            PositionEvent::Authorization(AuthorizationStatus::NotDetermined)
        ));
    }

    #[tokio::test]
    async fn test_request_authorization_grants() {
        let source =
            ScriptedPositionSource::new().with_authorization(AuthorizationStatus::NotDetermined);
        let mut rx = source.subscribe();

        source.request_authorization();

        assert_eq!(source.authorization(), AuthorizationStatus::Granted);
        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            PositionEvent::Authorization(AuthorizationStatus::Granted)
        ));
    }

    #[tokio::test]
    async fn test_request_authorization_denied() {
        let source = ScriptedPositionSource::new()
            .with_authorization(AuthorizationStatus::NotDetermined)
            .deny_authorization_requests();
        let mut rx = source.subscribe();

        source.request_authorization();
        assert_eq!(source.authorization(), AuthorizationStatus::Denied);

        // A second request does not prompt again
        source.request_authorization();
        let _first = rx.recv().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_emits_at_cadence() {
        let source = ScriptedPositionSource::new()
            .with_script(vec![hamburg()], Duration::from_secs(1));
        let mut rx = source.subscribe();

        source.start();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        source.stop();

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 2, "Expected one fix per second over 2.5s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_emission() {
        let source = ScriptedPositionSource::new()
            .with_script(vec![hamburg()], Duration::from_secs(1));
        let mut rx = source.subscribe();

        source.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        source.stop();

        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err(), "Stopped source should not emit");
    }
}

//! Lifecycle event sources.
//!
//! `LifecycleHub` bridges a host's foreground/background notifications into
//! the pipeline: platform glue calls [`LifecycleHub::notify`] and every
//! subscriber receives the event. `AlwaysActive` is the explicit no-op for
//! platforms without a foreground notion; it never emits, so the pipeline
//! behaves as always-active.

use tokio::sync::broadcast;

use super::traits::{LifecycleEvent, LifecycleSource};

/// Capacity of the lifecycle event channel.
const EVENT_CHANNEL_CAPACITY: usize = 8;

/// A lifecycle source fed by the host application.
pub struct LifecycleHub {
    events_tx: broadcast::Sender<LifecycleEvent>,
}

impl Default for LifecycleHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { events_tx }
    }

    /// Deliver a lifecycle transition to all subscribers.
    pub fn notify(&self, event: LifecycleEvent) {
        let _ = self.events_tx.send(event);
    }
}

impl LifecycleSource for LifecycleHub {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events_tx.subscribe()
    }
}

/// A lifecycle source that never emits.
///
/// Use on platforms without foreground/background transitions.
pub struct AlwaysActive {
    // Held so subscriber channels stay open (and silent) for the
    // lifetime of the source.
    events_tx: broadcast::Sender<LifecycleEvent>,
}

impl Default for AlwaysActive {
    fn default() -> Self {
        Self::new()
    }
}

impl AlwaysActive {
    /// Create an always-active lifecycle source.
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(1);
        Self { events_tx }
    }
}

impl LifecycleSource for AlwaysActive {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_delivers_to_all_subscribers() {
        let hub = LifecycleHub::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        hub.notify(LifecycleEvent::WillResignActive);

        assert_eq!(rx1.recv().await.unwrap(), LifecycleEvent::WillResignActive);
        assert_eq!(rx2.recv().await.unwrap(), LifecycleEvent::WillResignActive);
    }

    #[tokio::test]
    async fn test_hub_notify_without_subscribers_is_harmless() {
        let hub = LifecycleHub::new();
        hub.notify(LifecycleEvent::DidBecomeActive);
    }

    #[tokio::test]
    async fn test_always_active_never_emits() {
        let source = AlwaysActive::new();
        let mut rx = source.subscribe();

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}

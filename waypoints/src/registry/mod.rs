//! Synchronous callback fan-out.
//!
//! `ObserverRegistry` is an explicit multicast list: callbacks are held in
//! registration order and invoked synchronously on every notification. The
//! tracker uses it for legacy callback-style subscription alongside the
//! broadcast stream; callers that want a stream use `subscribe()` instead.

use std::sync::Mutex;

/// Identifies a registered observer for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback<T> = Box<dyn Fn(&T) + Send>;

struct RegistryInner<T> {
    next_id: u64,
    observers: Vec<(ObserverId, Callback<T>)>,
}

/// A mutex-guarded list of observer callbacks.
///
/// Callbacks run on the notifying thread, in registration order. They should
/// be cheap; long-running work belongs on the stream subscription side.
pub struct ObserverRegistry<T> {
    inner: Mutex<RegistryInner<T>>,
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObserverRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                next_id: 0,
                observers: Vec::new(),
            }),
        }
    }

    /// Register a callback. Returns an id for removal.
    pub fn add(&self, callback: Callback<T>) -> ObserverId {
        let mut inner = self.inner.lock().unwrap();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, callback));
        id
    }

    /// Remove a previously registered callback.
    ///
    /// Returns false if the id was not registered (or already removed).
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.observers.len();
        inner.observers.retain(|(observer_id, _)| *observer_id != id);
        inner.observers.len() != before
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().observers.len()
    }

    /// Whether the registry has no observers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every callback with the value, in registration order.
    pub fn notify(&self, value: &T) {
        let inner = self.inner.lock().unwrap();
        for (_, callback) in &inner.observers {
            callback(value);
        }
    }
}

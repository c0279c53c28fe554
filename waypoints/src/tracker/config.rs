//! Tracker configuration.

use std::time::Duration;

/// Default throttle interval between accepted fixes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Default minimum distance traveled before a change is published.
pub const DEFAULT_DISTANCE_THRESHOLD_METERS: f64 = 0.0;

/// Default capacity of the outcome broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// How raw fixes are filtered before geocoding.
///
/// The two policies reflect the system's history: distance thresholding came
/// first, interval throttling replaced it. Both are supported; the throttle
/// policy is the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdatePolicy {
    /// Accept a fix only when the last outcome is a failure or the fix has
    /// moved farther than `meters` from the last resolved position.
    DistanceThreshold {
        /// Minimum distance traveled, in meters.
        meters: f64,
    },

    /// Accept the first fix immediately, then at most one fix per interval,
    /// preferring the latest fix observed within the interval (trailing
    /// edge). Windows are anchored at acceptances: a window opens when a fix
    /// is accepted and the latest fix deferred inside it is accepted when
    /// the window elapses.
    IntervalThrottle {
        /// Minimum interval between accepted fixes.
        interval: Duration,
    },
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        UpdatePolicy::IntervalThrottle {
            interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

/// Configuration for a `LocationTracker`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// The fix filtering policy.
    pub policy: UpdatePolicy,

    /// Capacity of the outcome broadcast channel. Slow subscribers that fall
    /// more than this many outcomes behind observe a lag error and continue
    /// from the oldest retained outcome.
    pub channel_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            policy: UpdatePolicy::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl TrackerConfig {
    /// Config using the distance-threshold policy.
    pub fn distance_threshold(meters: f64) -> Self {
        Self {
            policy: UpdatePolicy::DistanceThreshold { meters },
            ..Default::default()
        }
    }

    /// Config using the interval-throttle policy.
    pub fn interval_throttle(interval: Duration) -> Self {
        Self {
            policy: UpdatePolicy::IntervalThrottle { interval },
            ..Default::default()
        }
    }

    /// Set the outcome channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

//! Update policy state machines.
//!
//! Pure decision logic, kept separate from the event loop so the policies
//! can be tested with explicit clocks. The loop feeds fixes in via `offer`,
//! sleeps until `deadline` when one is pending, and collects the deferred
//! fix with `expire`.

use std::time::Duration;

use tokio::time::Instant;

use crate::location::{LocationOutcome, RawFix};

/// Distance-threshold acceptance check.
///
/// A fix is accepted when the last outcome is a failure (always recover from
/// an unknown state) or when it has moved farther than the threshold from
/// the last resolved physical position.
pub(crate) fn distance_accepts(
    last: &LocationOutcome,
    fix: &RawFix,
    threshold_meters: f64,
) -> bool {
    match last {
        LocationOutcome::Resolved(location) => {
            location.physical.distance_meters(&fix.coordinate) > threshold_meters
        }
        LocationOutcome::Failed(_) => true,
    }
}

/// Trailing-edge, latest-wins throttle.
///
/// The first fix ever offered is accepted immediately and opens a window of
/// `interval`. Fixes offered while a window is open replace the pending
/// slot; when the window elapses with a pending fix, that fix is accepted
/// and a new window opens at the old deadline. A window that elapses with
/// nothing pending closes, so the next fix is accepted immediately and
/// re-anchors.
#[derive(Debug)]
pub(crate) struct ThrottleState {
    interval: Duration,
    window_deadline: Option<Instant>,
    pending: Option<RawFix>,
    accepted_first: bool,
}

impl ThrottleState {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_deadline: None,
            pending: None,
            accepted_first: false,
        }
    }

    /// Offer a fix. Returns the fix when it is accepted immediately;
    /// otherwise the fix is deferred into the pending slot.
    pub(crate) fn offer(&mut self, fix: RawFix, now: Instant) -> Option<RawFix> {
        if !self.accepted_first {
            self.accepted_first = true;
            self.window_deadline = Some(now + self.interval);
            return Some(fix);
        }

        match self.window_deadline {
            Some(deadline) if now < deadline => {
                self.pending = Some(fix);
                None
            }
            _ => {
                // No open window: accept immediately and re-anchor. A fix
                // still deferred from the elapsed window is superseded; it
                // must never publish after this newer one.
                self.pending = None;
                self.window_deadline = Some(now + self.interval);
                Some(fix)
            }
        }
    }

    /// The instant the loop must wake at, if a fix is pending.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        if self.pending.is_some() {
            self.window_deadline
        } else {
            None
        }
    }

    /// Collect the pending fix once the window has elapsed. Accepting it
    /// opens the next window at the old deadline.
    pub(crate) fn expire(&mut self, now: Instant) -> Option<RawFix> {
        let deadline = self.window_deadline?;
        if now < deadline {
            return None;
        }

        match self.pending.take() {
            Some(fix) => {
                self.window_deadline = Some(deadline + self.interval);
                Some(fix)
            }
            None => {
                self.window_deadline = None;
                None
            }
        }
    }
}

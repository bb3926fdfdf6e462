//! Tick-driven countdown timers.
//!
//! Every wait in the controller (periodic check, ramp supervision,
//! fluctuation pauses and bursts) is an explicit [`Countdown`] advanced by
//! the control loop.  Nothing sleeps; a timer only moves when `tick` is
//! called, so cancelling one simply drops its remaining time.
//!
//! ```text
//!   arm(5.0) ──tick(dt)──▶ remaining -= dt ──[≤ 0]──▶ fires once, disarms
//!       ▲                                                  │
//!       └───────────── arm() again for a fresh interval ◀──┘
//! ```

use log::trace;

/// Slack for accumulated `f32` rounding when many small ticks sum to an interval.
const EXPIRY_EPSILON: f32 = 1e-4;

/// A one-shot countdown measured in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    /// Human-readable label for logs.
    label: &'static str,
    /// Seconds left, or `None` when disarmed.
    remaining: Option<f32>,
}

impl Countdown {
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            remaining: None,
        }
    }

    /// Start a fresh interval, discarding any time left on the previous one.
    pub fn arm(&mut self, secs: f32) {
        trace!("timer '{}': armed for {:.2}s", self.label, secs);
        self.remaining = Some(secs.max(0.0));
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        if self.remaining.take().is_some() {
            trace!("timer '{}': cancelled", self.label);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `dt` seconds.  Returns `true` exactly once, on the tick
    /// the interval elapses; the timer is disarmed afterwards.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= EXPIRY_EPSILON {
            trace!("timer '{}': fired", self.label);
            self.remaining = None;
            return true;
        }
        false
    }
}

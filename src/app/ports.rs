//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (the fan, event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the control core never touches a peripheral directly.

use crate::error::ActuatorError;

// ───────────────────────────────────────────────────────────────
// Fan port (driven adapter: domain ↔ actuator)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the single fan actuator.
///
/// Speeds are signed: the sign selects heating vs cooling airflow, the
/// magnitude is in the same units as the controller's rate.  Implementations
/// interpolate monotonically from the current speed to the target over the
/// requested duration.
pub trait FanPort {
    /// Begin ramping towards `target_speed` over `ramp_secs`.
    /// Replaces any ramp in progress.
    fn ramp_to(&mut self, target_speed: f32, ramp_secs: f32);

    /// Advance the fan by `dt_secs` and report where it is.
    fn poll(&mut self, dt_secs: f32) -> FanFeedback;

    /// Cut drive immediately (speed 0, no ramp).
    fn stop(&mut self);
}

/// Snapshot of the fan returned by [`FanPort::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FanFeedback {
    /// Present signed speed.
    pub speed: f32,
    /// Speed of the most recent ramp command.
    pub target_speed: f32,
    /// True once `speed` has reached `target_speed`.
    pub ramp_complete: bool,
    /// Set when the drive hardware reported a failure this poll.
    pub fault: Option<ActuatorError>,
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / displays)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, display, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

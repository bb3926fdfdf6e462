//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, draw a thermostat display,
//! push them to a dashboard, etc.

use serde::Serialize;

use crate::control::membership::TriangleShape;
use crate::control::rule::RuleLabel;
use crate::error::{ActuatorError, ConfigError, Error};
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.  Transient states are
    /// reported too, so `Idle -> Evaluating -> Actuating` is two events.
    StateChanged { from: StateId, to: StateId },

    /// The plant temperature moved.
    TemperatureChanged(f32),

    /// An inference pass completed on `error = target - current`.
    Inferred { error: f32, rate: f32, degenerate: bool },

    /// Evaluation refused to arm actuation (bad rule shapes, sign guard).
    InferenceRejected(Error),

    /// The fan misbehaved and the episode was aborted.
    ActuatorFault(ActuatorError),

    /// An actuation episode reached its target.
    Converged { temperature: f32 },

    /// A configuration batch took effect.
    ConfigCommitted,

    /// A configuration batch was refused; the previous config stays.
    ConfigRejected(ConfigError),

    /// Periodic telemetry snapshot.
    Telemetry(Telemetry),
}

/// Which way the fan is pushing the plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClimateMode {
    Off,
    Heating,
    Cooling,
}

impl ClimateMode {
    /// Mode implied by a signed actuation rate.
    pub fn from_rate(rate: f32) -> Self {
        if rate > 0.0 {
            Self::Heating
        } else if rate < 0.0 {
            Self::Cooling
        } else {
            Self::Off
        }
    }
}

/// A point-in-time snapshot of everything an outside reader may observe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub state: StateId,
    /// Seconds spent in `state` so far.
    pub secs_in_state: f32,
    pub mode: ClimateMode,
    pub current_temperature: f32,
    pub target_temperature: f32,
    pub fluctuation_allowed: bool,
    pub fluctuation_active: bool,
    pub fan_speed: f32,
    /// Rate from the most recent inference, if any succeeded.
    pub last_rate: Option<f32>,
    pub antecedents: [(RuleLabel, TriangleShape); RuleLabel::COUNT],
}

//! Fan drivers.
//!
//! Both drivers share the same linear [`Ramp`] and implement
//! [`FanPort`](crate::app::ports::FanPort):
//!
//! - [`SimFan`] keeps the speed in memory only (host simulation, tests).
//!   It can be told to stall so ramp supervision can be exercised.
//! - [`PwmFan`] drives any `embedded-hal` PWM channel for the magnitude and
//!   an output pin for the airflow direction.
//!
//! The controller never reads fan internals; it only waits for
//! `ramp_complete` in the polled [`FanFeedback`].

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

use crate::app::ports::{FanFeedback, FanPort};
use crate::error::ActuatorError;

/// Speed tolerance for "ramp reached target".
const SPEED_EPSILON: f32 = 1e-4;

// ---------------------------------------------------------------------------
// Ramp
// ---------------------------------------------------------------------------

/// Linear interpolation from `from` to `to` over `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Ramp {
    /// A ramp that is already complete at `speed`.
    pub const fn settled(speed: f32) -> Self {
        Self {
            from: speed,
            to: speed,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` and return the interpolated speed.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.speed()
    }

    pub fn speed(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let f = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * f
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_complete(&self) -> bool {
        (self.speed() - self.to).abs() <= SPEED_EPSILON
    }
}

// ---------------------------------------------------------------------------
// Simulated fan
// ---------------------------------------------------------------------------

/// In-memory fan used by the host simulation and tests.
#[derive(Debug, Clone)]
pub struct SimFan {
    ramp: Ramp,
    /// When set, the fan ignores time and never finishes a ramp.
    stalled: bool,
}

impl SimFan {
    pub fn new() -> Self {
        Self {
            ramp: Ramp::settled(0.0),
            stalled: false,
        }
    }

    /// Freeze (or unfreeze) the rotor for fault injection.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    pub fn speed(&self) -> f32 {
        self.ramp.speed()
    }
}

impl Default for SimFan {
    fn default() -> Self {
        Self::new()
    }
}

impl FanPort for SimFan {
    fn ramp_to(&mut self, target_speed: f32, ramp_secs: f32) {
        debug!(
            "SimFan: ramp {:.3} -> {:.3} over {:.2}s",
            self.ramp.speed(),
            target_speed,
            ramp_secs
        );
        self.ramp = Ramp::new(self.ramp.speed(), target_speed, ramp_secs);
    }

    fn poll(&mut self, dt_secs: f32) -> FanFeedback {
        let speed = if self.stalled {
            self.ramp.speed()
        } else {
            self.ramp.advance(dt_secs)
        };
        FanFeedback {
            speed,
            target_speed: self.ramp.target(),
            ramp_complete: !self.stalled && self.ramp.is_complete(),
            fault: None,
        }
    }

    fn stop(&mut self) {
        self.ramp = Ramp::settled(0.0);
    }
}

// ---------------------------------------------------------------------------
// PWM fan
// ---------------------------------------------------------------------------

/// Fan on a PWM channel plus a direction pin.
///
/// `|speed| / max_speed` maps to duty percent; the direction pin is driven
/// high for positive (heating) airflow and low otherwise.
pub struct PwmFan<P, D> {
    pwm: P,
    dir: D,
    max_speed: f32,
    ramp: Ramp,
    last_duty: u8,
}

impl<P: SetDutyCycle, D: OutputPin> PwmFan<P, D> {
    pub fn new(pwm: P, dir: D, max_speed: f32) -> Self {
        Self {
            pwm,
            dir,
            max_speed: max_speed.max(SPEED_EPSILON),
            ramp: Ramp::settled(0.0),
            last_duty: 0,
        }
    }

    /// Last duty percent written to the channel.
    pub fn duty_percent(&self) -> u8 {
        self.last_duty
    }

    /// Release the peripherals.
    pub fn into_inner(self) -> (P, D) {
        (self.pwm, self.dir)
    }

    fn duty_for(&self, speed: f32) -> u8 {
        ((speed.abs() / self.max_speed) * 100.0).round().clamp(0.0, 100.0) as u8
    }

    fn write(&mut self, speed: f32) -> Result<(), ActuatorError> {
        let duty = self.duty_for(speed);
        let dir = if speed > 0.0 {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        };
        dir.map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.pwm
            .set_duty_cycle_percent(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.last_duty = duty;
        Ok(())
    }
}

impl<P: SetDutyCycle, D: OutputPin> FanPort for PwmFan<P, D> {
    fn ramp_to(&mut self, target_speed: f32, ramp_secs: f32) {
        self.ramp = Ramp::new(self.ramp.speed(), target_speed, ramp_secs);
    }

    fn poll(&mut self, dt_secs: f32) -> FanFeedback {
        let speed = self.ramp.advance(dt_secs);
        let fault = self.write(speed).err();
        if let Some(e) = fault {
            warn!("PwmFan: {e}");
        }
        FanFeedback {
            speed,
            target_speed: self.ramp.target(),
            ramp_complete: fault.is_none() && self.ramp.is_complete(),
            fault,
        }
    }

    fn stop(&mut self) {
        self.ramp = Ramp::settled(0.0);
        if let Err(e) = self.write(0.0) {
            warn!("PwmFan: stop failed: {e}");
        }
    }
}

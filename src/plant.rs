//! World temperature model.
//!
//! A single scalar temperature confined to the configured world range, plus
//! an ambient fluctuation process that randomly pushes it around when the
//! controller is not actuating.
//!
//! ```text
//!  DORMANT ──[enabled && active]──▶ WAITING ──[wait elapsed]──▶ DRIFTING
//!     ▲                               ▲                            │
//!     │                               └──────[burst elapsed]───────┘
//!     └────────[disabled || suppressed] (from any phase)
//! ```
//!
//! Suppression drops the pending wait or burst entirely; resuming always
//! starts with a fresh random wait.  Temperature already drifted stays.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Band, SystemConfig};
use crate::scheduler::Countdown;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluctuationPhase {
    /// Not running (policy off or suppressed by the controller).
    Dormant,
    /// Pausing before the next burst.
    Waiting,
    /// Integrating a random signed rate until the burst timer elapses.
    Drifting { rate: f32 },
}

/// Bounds the fluctuation process draws from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FluctuationBounds {
    wait: Band,
    length: Band,
    rate: Band,
}

impl FluctuationBounds {
    fn from_config(config: &SystemConfig) -> Self {
        Self {
            wait: config.fluctuation_wait_range,
            length: config.fluctuation_length_range,
            rate: config.fluctuation_rate_range,
        }
    }
}

/// The simulated plant.
pub struct Plant {
    range: Band,
    current: f32,
    target: f32,
    /// Policy bit: fluctuation allowed by configuration.
    fluctuation_enabled: bool,
    /// Runtime bit: cleared by the controller while it actuates.
    fluctuation_active: bool,
    bounds: FluctuationBounds,
    phase: FluctuationPhase,
    timer: Countdown,
    rng: StdRng,
    /// Set whenever `current` changes; drained by [`Plant::take_changed`].
    changed: bool,
}

impl Plant {
    pub fn new(config: &SystemConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let range = config.world_range;
        let mut plant = Self {
            range,
            current: range.clamp(config.initial_temperature),
            target: range.clamp(config.target_temperature),
            fluctuation_enabled: config.fluctuation_allowed,
            fluctuation_active: true,
            bounds: FluctuationBounds::from_config(config),
            phase: FluctuationPhase::Dormant,
            timer: Countdown::new("fluctuation"),
            rng,
            changed: false,
        };
        plant.refresh_fluctuation();
        plant
    }

    // ── Temperature ───────────────────────────────────────────

    /// Clamp `t` into the world range and store it.  Returns the stored value.
    pub fn set_temperature(&mut self, t: f32) -> f32 {
        let clamped = self.range.clamp(t);
        if clamped != self.current {
            self.current = clamped;
            self.changed = true;
        }
        self.current
    }

    /// Shift the temperature by `delta`, clamped.  Returns the new value.
    pub fn nudge(&mut self, delta: f32) -> f32 {
        self.set_temperature(self.current + delta)
    }

    pub fn temperature(&self) -> f32 {
        self.current
    }

    pub fn set_target(&mut self, t: f32) {
        self.target = self.range.clamp(t);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// `target - current`: positive when the plant is too cold.
    pub fn error(&self) -> f32 {
        self.target - self.current
    }

    pub fn range(&self) -> Band {
        self.range
    }

    /// The new temperature if it changed since the last call.
    pub fn take_changed(&mut self) -> Option<f32> {
        if core::mem::take(&mut self.changed) {
            Some(self.current)
        } else {
            None
        }
    }

    /// Adopt a freshly committed configuration.  Range first, then the
    /// values that depend on it.
    pub fn apply_config(&mut self, config: &SystemConfig) {
        self.range = config.world_range;
        self.set_target(config.target_temperature);
        self.set_temperature(self.current);
        self.bounds = FluctuationBounds::from_config(config);
        self.set_fluctuation_enabled(config.fluctuation_allowed);
    }

    // ── Fluctuation ───────────────────────────────────────────

    pub fn set_fluctuation_enabled(&mut self, enabled: bool) {
        self.fluctuation_enabled = enabled;
        self.refresh_fluctuation();
    }

    /// Suppress (`false`) or resume (`true`) fluctuation at runtime.
    pub fn set_fluctuation_active(&mut self, active: bool) {
        self.fluctuation_active = active;
        self.refresh_fluctuation();
    }

    pub fn fluctuation_enabled(&self) -> bool {
        self.fluctuation_enabled
    }

    pub fn fluctuation_active(&self) -> bool {
        self.fluctuation_active
    }

    pub fn fluctuation_phase(&self) -> FluctuationPhase {
        self.phase
    }

    /// Advance the fluctuation process by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        match self.phase {
            FluctuationPhase::Dormant => {}
            FluctuationPhase::Waiting => {
                if self.timer.tick(dt) {
                    self.begin_burst();
                }
            }
            FluctuationPhase::Drifting { rate } => {
                let t = self.nudge(rate * dt);
                trace!("plant: drift {:+.3}/s -> {:.3}", rate, t);
                if self.timer.tick(dt) {
                    self.begin_wait();
                }
            }
        }
    }

    fn refresh_fluctuation(&mut self) {
        let should_run = self.fluctuation_enabled && self.fluctuation_active;
        match (should_run, self.phase) {
            (true, FluctuationPhase::Dormant) => self.begin_wait(),
            (false, FluctuationPhase::Dormant) | (true, _) => {}
            (false, _) => {
                debug!("plant: fluctuation stopped");
                self.timer.cancel();
                self.phase = FluctuationPhase::Dormant;
            }
        }
    }

    fn begin_wait(&mut self) {
        let wait = self.sample(self.bounds.wait);
        self.timer.arm(wait);
        self.phase = FluctuationPhase::Waiting;
        trace!("plant: next fluctuation in {:.2}s", wait);
    }

    fn begin_burst(&mut self) {
        let magnitude = self.sample(self.bounds.rate);
        let rate = if self.rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        };
        let length = self.sample(self.bounds.length);
        self.timer.arm(length);
        self.phase = FluctuationPhase::Drifting { rate };
        debug!("plant: fluctuation {:+.3}/s for {:.2}s", rate, length);
    }

    fn sample(&mut self, band: Band) -> f32 {
        if band.min >= band.max {
            band.min
        } else {
            self.rng.random_range(band.min..=band.max)
        }
    }
}

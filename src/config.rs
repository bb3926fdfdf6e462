//! System configuration parameters
//!
//! All tunable parameters for the climate loop, plus the batched
//! [`ConfigUpdate`] that collaborators use to change them.  Every value is
//! clamped into a fixed absolute bound (see [`limits`]) before it is applied;
//! a batch that is still inconsistent after clamping is rejected whole.

use serde::{Deserialize, Serialize};

use crate::control::rule::RuleSet;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Band: a closed `[min, max]` interval
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Clamp a scalar into this band.  Assumes the band is ordered.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Clamp both endpoints into `bound` independently.
    pub fn clamped_to(&self, bound: Band) -> Band {
        Band {
            min: bound.clamp(self.min),
            max: bound.clamp(self.max),
        }
    }
}

/// Absolute hardware bounds every configuration value is clamped into.
pub mod limits {
    use super::Band;

    /// World temperature range.
    pub const WORLD: Band = Band::new(-100.0, 200.0);
    /// Lower edge of the acceptance band (offset below target).
    pub const ACCEPTANCE_LO: Band = Band::new(-10.0, 0.0);
    /// Upper edge of the acceptance band (offset above target).
    pub const ACCEPTANCE_HI: Band = Band::new(0.0, 10.0);
    /// Pause between fluctuation bursts (seconds).
    pub const FLUCTUATION_WAIT: Band = Band::new(0.0, 300.0);
    /// Duration of a fluctuation burst (seconds).
    pub const FLUCTUATION_LENGTH: Band = Band::new(0.0, 120.0);
    /// Magnitude of fluctuation drift (degrees per second).
    pub const FLUCTUATION_RATE: Band = Band::new(0.0, 5.0);
    /// Periodic check interval (seconds).
    pub const CHECK_INTERVAL: Band = Band::new(0.1, 600.0);
}

// ---------------------------------------------------------------------------
// SystemConfig
// ---------------------------------------------------------------------------

/// Core system configuration.  Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Plant ---
    /// Range the world temperature is confined to.
    pub world_range: Band,
    /// Temperature the controller converges towards.
    pub target_temperature: f32,
    /// Plant temperature at construction.
    pub initial_temperature: f32,

    // --- Control ---
    /// Error band around the target that needs no actuation.  `min <= 0 <= max`.
    pub acceptance_range: Band,
    /// Seconds between periodic checks while idle.
    pub check_interval_secs: f32,

    // --- Fluctuation ---
    /// Whether ambient fluctuation may run at all.
    pub fluctuation_allowed: bool,
    /// Uniform range for the pause before each burst (seconds).
    pub fluctuation_wait_range: Band,
    /// Uniform range for the length of each burst (seconds).
    pub fluctuation_length_range: Band,
    /// Uniform range for the drift magnitude (degrees per second).
    pub fluctuation_rate_range: Band,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when `None`.
    pub rng_seed: Option<u64>,

    // --- Fan ---
    /// Duration of every commanded speed ramp (seconds).
    pub fan_ramp_secs: f32,
    /// Ramp must report completion within this many seconds.
    pub ramp_timeout_secs: f32,

    // --- Timing ---
    /// Control loop tick (milliseconds).
    pub tick_period_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Plant
            world_range: Band::new(40.0, 100.0),
            target_temperature: 70.0,
            initial_temperature: 70.0,

            // Control
            acceptance_range: Band::new(-2.0, 2.0),
            check_interval_secs: 5.0,

            // Fluctuation
            fluctuation_allowed: true,
            fluctuation_wait_range: Band::new(5.0, 20.0),
            fluctuation_length_range: Band::new(2.0, 8.0),
            fluctuation_rate_range: Band::new(0.1, 0.5),
            rng_seed: None,

            // Fan
            fan_ramp_secs: 1.5,
            ramp_timeout_secs: 10.0,

            // Timing
            tick_period_ms: 100, // 10 Hz
            telemetry_interval_secs: 30,
        }
    }
}

impl SystemConfig {
    /// Seconds per control tick.
    pub fn tick_secs(&self) -> f32 {
        self.tick_period_ms as f32 / 1000.0
    }

    /// Check that every field is finite, ordered and within its bound, and
    /// that the world and acceptance ranges yield five ordered antecedents.
    ///
    /// Runs on construction and on every candidate a [`ConfigUpdate`] produces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_band("world_range", self.world_range, limits::WORLD)?;
        if self.world_range.width() <= 0.0 {
            return Err(ConfigError::EmptyWorldRange);
        }
        check_finite("target_temperature", self.target_temperature)?;
        check_finite("initial_temperature", self.initial_temperature)?;

        let acc = self.acceptance_range;
        if !acc.is_finite() {
            return Err(ConfigError::NotFinite("acceptance_range"));
        }
        if acc.clamped_to(limits::ACCEPTANCE_LO).min != acc.min
            || acc.clamped_to(limits::ACCEPTANCE_HI).max != acc.max
        {
            return Err(ConfigError::InvertedRange {
                field: "acceptance_range",
                min: acc.min,
                max: acc.max,
            });
        }

        check_band(
            "fluctuation_wait_range",
            self.fluctuation_wait_range,
            limits::FLUCTUATION_WAIT,
        )?;
        check_band(
            "fluctuation_length_range",
            self.fluctuation_length_range,
            limits::FLUCTUATION_LENGTH,
        )?;
        check_band(
            "fluctuation_rate_range",
            self.fluctuation_rate_range,
            limits::FLUCTUATION_RATE,
        )?;

        check_finite("check_interval_secs", self.check_interval_secs)?;
        if limits::CHECK_INTERVAL.clamp(self.check_interval_secs) != self.check_interval_secs {
            return Err(ConfigError::InvertedRange {
                field: "check_interval_secs",
                min: limits::CHECK_INTERVAL.min,
                max: self.check_interval_secs,
            });
        }

        check_finite("fan_ramp_secs", self.fan_ramp_secs)?;
        check_finite("ramp_timeout_secs", self.ramp_timeout_secs)?;
        if self.fan_ramp_secs < 0.0 || self.ramp_timeout_secs < self.fan_ramp_secs {
            return Err(ConfigError::InvertedRange {
                field: "ramp_timeout_secs",
                min: self.fan_ramp_secs,
                max: self.ramp_timeout_secs,
            });
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::NotFinite("tick_period_ms"));
        }

        // Antecedents are placed from these ranges; every shape must be ordered.
        RuleSet::new(self.world_range, acc)
            .validate()
            .map_err(ConfigError::RuleShape)
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite(field))
    }
}

fn check_band(field: &'static str, band: Band, bound: Band) -> Result<(), ConfigError> {
    if !band.is_finite() {
        return Err(ConfigError::NotFinite(field));
    }
    if !band.is_ordered() || band.clamped_to(bound) != band {
        return Err(ConfigError::InvertedRange {
            field,
            min: band.min,
            max: band.max,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ConfigUpdate: batched, clamping setter surface
// ---------------------------------------------------------------------------

/// A batch of configuration changes committed atomically.
///
/// Fields left `None` keep their current value.  Built with the chained
/// setters, e.g. `ConfigUpdate::new().world_range(40.0, 100.0).target(70.0)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub world_range: Option<Band>,
    pub target_temperature: Option<f32>,
    pub acceptance_range: Option<Band>,
    pub fluctuation_wait_range: Option<Band>,
    pub fluctuation_length_range: Option<Band>,
    pub fluctuation_rate_range: Option<Band>,
    pub check_interval_secs: Option<f32>,
    pub fluctuation_allowed: Option<bool>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world_range(mut self, min: f32, max: f32) -> Self {
        self.world_range = Some(Band::new(min, max));
        self
    }

    pub fn target(mut self, temperature: f32) -> Self {
        self.target_temperature = Some(temperature);
        self
    }

    pub fn acceptance_range(mut self, lo: f32, hi: f32) -> Self {
        self.acceptance_range = Some(Band::new(lo, hi));
        self
    }

    pub fn fluctuation_wait_range(mut self, min: f32, max: f32) -> Self {
        self.fluctuation_wait_range = Some(Band::new(min, max));
        self
    }

    pub fn fluctuation_length_range(mut self, min: f32, max: f32) -> Self {
        self.fluctuation_length_range = Some(Band::new(min, max));
        self
    }

    pub fn fluctuation_rate_range(mut self, min: f32, max: f32) -> Self {
        self.fluctuation_rate_range = Some(Band::new(min, max));
        self
    }

    pub fn check_interval(mut self, secs: f32) -> Self {
        self.check_interval_secs = Some(secs);
        self
    }

    pub fn fluctuation_allowed(mut self, allowed: bool) -> Self {
        self.fluctuation_allowed = Some(allowed);
        self
    }

    /// Produce the candidate config this batch yields on top of `base`.
    ///
    /// Order: every value is clamped into its absolute bound first, then the
    /// target is clamped into the (possibly new) world range.  `base` is not
    /// touched; on error the caller keeps using it.
    pub fn apply_to(&self, base: &SystemConfig) -> Result<SystemConfig, ConfigError> {
        let mut next = base.clone();

        if let Some(r) = self.world_range {
            let r = clamp_band("world_range", r, limits::WORLD)?;
            if r.width() <= 0.0 {
                return Err(ConfigError::EmptyWorldRange);
            }
            next.world_range = r;
        }

        if let Some(r) = self.acceptance_range {
            if !r.is_finite() {
                return Err(ConfigError::NotFinite("acceptance_range"));
            }
            next.acceptance_range = Band::new(
                limits::ACCEPTANCE_LO.clamp(r.min),
                limits::ACCEPTANCE_HI.clamp(r.max),
            );
        }

        if let Some(r) = self.fluctuation_wait_range {
            next.fluctuation_wait_range =
                clamp_band("fluctuation_wait_range", r, limits::FLUCTUATION_WAIT)?;
        }
        if let Some(r) = self.fluctuation_length_range {
            next.fluctuation_length_range =
                clamp_band("fluctuation_length_range", r, limits::FLUCTUATION_LENGTH)?;
        }
        if let Some(r) = self.fluctuation_rate_range {
            next.fluctuation_rate_range =
                clamp_band("fluctuation_rate_range", r, limits::FLUCTUATION_RATE)?;
        }

        if let Some(secs) = self.check_interval_secs {
            check_finite("check_interval_secs", secs)?;
            next.check_interval_secs = limits::CHECK_INTERVAL.clamp(secs);
        }

        if let Some(allowed) = self.fluctuation_allowed {
            next.fluctuation_allowed = allowed;
        }

        // Dependent value last: target follows the new world range.
        let target = self.target_temperature.unwrap_or(next.target_temperature);
        check_finite("target_temperature", target)?;
        next.target_temperature = next.world_range.clamp(target);

        Ok(next)
    }
}

fn clamp_band(field: &'static str, band: Band, bound: Band) -> Result<Band, ConfigError> {
    if !band.is_finite() {
        return Err(ConfigError::NotFinite(field));
    }
    let clamped = band.clamped_to(bound);
    if !clamped.is_ordered() {
        return Err(ConfigError::InvertedRange {
            field,
            min: clamped.min,
            max: clamped.max,
        });
    }
    Ok(clamped)
}

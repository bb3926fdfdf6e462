//! Unified error types for the fuzzy climate controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! service's error handling uniform.  All variants are `Copy` so they can be
//! carried inside [`AppEvent`](crate::app::events::AppEvent)s and returned
//! from config commits without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A configuration commit was rejected.
    Config(ConfigError),
    /// The rule base is structurally invalid for this cycle.
    Rule(RuleError),
    /// The inference engine could not produce a usable rate.
    Inference(InferenceError),
    /// The fan did not behave as commanded.
    Actuator(ActuatorError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Rule(e) => write!(f, "rule: {e}"),
            Self::Inference(e) => write!(f, "inference: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Reasons a configuration commit is refused.  The previous configuration
/// stays in force whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A `[min, max]` pair is still inverted after clamping to its bounds.
    InvertedRange { field: &'static str, min: f32, max: f32 },
    /// A value is NaN or infinite.
    NotFinite(&'static str),
    /// The world range collapsed to zero width.
    EmptyWorldRange,
    /// World and acceptance ranges place an antecedent out of order.
    RuleShape(RuleError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedRange { field, min, max } => {
                write!(f, "{field}: min {min} > max {max}")
            }
            Self::NotFinite(field) => write!(f, "{field}: value is not finite"),
            Self::EmptyWorldRange => write!(f, "world range has zero width"),
            Self::RuleShape(e) => write!(f, "ranges do not tile: {e}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleError {
    /// A rule's antecedent violates `a <= b <= c`.
    InvalidShape { rule: &'static str, a: f32, b: f32, c: f32 },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape { rule, a, b, c } => {
                write!(f, "{rule} antecedent ({a}, {b}, {c}) is not ordered")
            }
        }
    }
}

impl core::error::Error for RuleError {}

impl From<RuleError> for Error {
    fn from(e: RuleError) -> Self {
        Self::Rule(e)
    }
}

// ---------------------------------------------------------------------------
// Inference errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InferenceError {
    /// No rules were supplied.
    EmptyRuleSet,
    /// More rules than the engine's fixed firing buffer holds.
    TooManyRules(usize),
    /// The input error is NaN or infinite.
    NonFiniteInput,
    /// The rate would drive the plant away from the target.
    DirectionMismatch { rate: f32, error: f32 },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRuleSet => write!(f, "empty rule set"),
            Self::TooManyRules(n) => write!(f, "{n} rules exceed engine capacity"),
            Self::NonFiniteInput => write!(f, "input is not finite"),
            Self::DirectionMismatch { rate, error } => {
                write!(f, "rate {rate:.3} opposes error {error:.3}")
            }
        }
    }
}

impl core::error::Error for InferenceError {}

impl From<InferenceError> for Error {
    fn from(e: InferenceError) -> Self {
        Self::Inference(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorError {
    /// A commanded ramp did not complete within the configured timeout.
    RampTimeout { target_speed: f32, waited_secs: f32 },
    /// The PWM peripheral rejected a duty-cycle write.
    PwmWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RampTimeout {
                target_speed,
                waited_secs,
            } => write!(
                f,
                "ramp to {target_speed:.2} incomplete after {waited_secs:.1}s"
            ),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl core::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

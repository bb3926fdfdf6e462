//! Membership functions for the fuzzy controller.
//!
//! A membership function maps a crisp input to a degree of truth in
//! `[0, 1]`.  Callers check [`MembershipFunction::validate`] before
//! evaluating; evaluating an invalid shape yields [`INVALID_VALUE`] rather
//! than panicking.

use serde::{Deserialize, Serialize};

/// Full membership.
pub const MAX_VALUE: f32 = 1.0;
/// No membership.
pub const MIN_VALUE: f32 = 0.0;
/// Returned by `evaluate` on a shape that fails `validate`.
pub const INVALID_VALUE: f32 = -999.9;

/// A scalar shape with a validity precondition.
pub trait MembershipFunction {
    /// Whether the shape's parameters are consistent.  Pure.
    fn validate(&self) -> bool;

    /// Degree of membership of `x`.  Only meaningful when [`validate`]
    /// holds; otherwise returns [`INVALID_VALUE`].
    ///
    /// [`validate`]: MembershipFunction::validate
    fn evaluate(&self, x: f32) -> f32;
}

/// Triangle with feet at `a` and `c` and its peak at `b`.
///
/// `a == b` or `b == c` gives a one-sided wedge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleShape {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl TriangleShape {
    pub const fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    /// Overwrite all three control points in place.
    pub fn reset(&mut self, a: f32, b: f32, c: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
    }
}

impl MembershipFunction for TriangleShape {
    fn validate(&self) -> bool {
        // False for NaN as well.
        self.a <= self.b && self.b <= self.c
    }

    fn evaluate(&self, x: f32) -> f32 {
        if !self.validate() {
            return INVALID_VALUE;
        }
        let Self { a, b, c } = *self;

        if (a == b && b == x) || (b == c && b == x) {
            return MAX_VALUE;
        }

        if a <= x && x < b {
            let width = b - a;
            // Zero-width rising edge: report the foot.
            if width <= 0.0 {
                return MIN_VALUE;
            }
            return ((x - a) / width).clamp(MIN_VALUE, MAX_VALUE);
        }

        if b <= x && x < c {
            let width = c - b;
            // Zero-width falling edge: report the peak.
            if width <= 0.0 {
                return MAX_VALUE;
            }
            return ((c - x) / width).clamp(MIN_VALUE, MAX_VALUE);
        }

        MIN_VALUE
    }
}

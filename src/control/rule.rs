//! Takagi-Sugeno rules and the fixed five-rule base.
//!
//! ```text
//!  degree
//!   1 ┤█           ▲         ▲         ▲           █
//!     │ █  ML     ╱ ╲  L    ╱ ╲  A    ╱ ╲  H     █  MH
//!     │  █       ╱   ╲     ╱   ╲     ╱   ╲     █
//!   0 ┼───█─────╱─────╲───╱─────╲───╱─────╲───█──────▶ error
//!   -span   -0.5s  -0.3s  lo   0   hi  0.3s  0.5s   span
//! ```
//!
//! The antecedents are rebuilt from the current ranges on every evaluation,
//! so the five triangles always tile `[-span, span]` around the acceptance
//! band whatever the world range is.

use serde::{Deserialize, Serialize};

use super::membership::{MembershipFunction, TriangleShape};
use crate::config::Band;
use crate::error::RuleError;

/// A rule the inference engine can combine.
pub trait FuzzyRule: MembershipFunction {
    /// Crisp output contribution for a given firing strength.
    fn rate_of(&self, strength: f32) -> f32;
}

// ---------------------------------------------------------------------------
// Consequent
// ---------------------------------------------------------------------------

/// Linear consequent `rate = slope * strength + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearConsequent {
    pub slope: f32,
    pub offset: f32,
}

impl LinearConsequent {
    pub const fn new(slope: f32, offset: f32) -> Self {
        Self { slope, offset }
    }

    pub fn apply(&self, strength: f32) -> f32 {
        self.slope * strength + self.offset
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Semantic label of each rule, in antecedent order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RuleLabel {
    MuchLower = 0,
    Lower = 1,
    Acceptable = 2,
    Higher = 3,
    MuchHigher = 4,
}

impl RuleLabel {
    pub const COUNT: usize = 5;
    pub const ALL: [RuleLabel; Self::COUNT] = [
        Self::MuchLower,
        Self::Lower,
        Self::Acceptable,
        Self::Higher,
        Self::MuchHigher,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::MuchLower => "MuchLower",
            Self::Lower => "Lower",
            Self::Acceptable => "Acceptable",
            Self::Higher => "Higher",
            Self::MuchHigher => "MuchHigher",
        }
    }

    /// The fixed output function for this rule.
    pub fn consequent(self) -> LinearConsequent {
        match self {
            Self::MuchLower => LinearConsequent::new(-6.0, 1.0),
            Self::Lower => LinearConsequent::new(-2.5, 0.0),
            Self::Acceptable => LinearConsequent::new(0.0, 0.0),
            Self::Higher => LinearConsequent::new(2.5, 0.0),
            Self::MuchHigher => LinearConsequent::new(6.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// TsRule
// ---------------------------------------------------------------------------

/// One rule: triangular antecedent plus linear consequent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TsRule {
    label: RuleLabel,
    shape: TriangleShape,
    consequent: LinearConsequent,
}

impl TsRule {
    pub fn new(label: RuleLabel, shape: TriangleShape, consequent: LinearConsequent) -> Self {
        Self {
            label,
            shape,
            consequent,
        }
    }

    pub fn label(&self) -> RuleLabel {
        self.label
    }

    pub fn shape(&self) -> TriangleShape {
        self.shape
    }

    pub fn consequent(&self) -> LinearConsequent {
        self.consequent
    }

    /// Move the antecedent; label and consequent are untouched.
    pub fn reset(&mut self, a: f32, b: f32, c: f32) {
        self.shape.reset(a, b, c);
    }
}

impl MembershipFunction for TsRule {
    fn validate(&self) -> bool {
        self.shape.validate()
    }

    fn evaluate(&self, x: f32) -> f32 {
        self.shape.evaluate(x)
    }
}

impl FuzzyRule for TsRule {
    fn rate_of(&self, strength: f32) -> f32 {
        self.consequent.apply(strength)
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// The five fixed rules, indexed by [`RuleLabel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: [TsRule; RuleLabel::COUNT],
}

impl RuleSet {
    /// Build the rule base and place the antecedents for `world` / `acceptance`.
    pub fn new(world: Band, acceptance: Band) -> Self {
        let rules = RuleLabel::ALL.map(|label| {
            TsRule::new(label, TriangleShape::new(0.0, 0.0, 0.0), label.consequent())
        });
        let mut set = Self { rules };
        set.recompute(world, acceptance);
        set
    }

    /// Re-place every antecedent in place from the current ranges.
    pub fn recompute(&mut self, world: Band, acceptance: Band) {
        let span = world.width();
        let (lo, hi) = (acceptance.min, acceptance.max);

        self.rules[RuleLabel::MuchLower as usize].reset(-span, -span, -0.3 * span);
        self.rules[RuleLabel::Lower as usize].reset(-0.5 * span, -0.3 * span, lo);
        self.rules[RuleLabel::Acceptable as usize].reset(lo, 0.0, hi);
        self.rules[RuleLabel::Higher as usize].reset(hi, 0.3 * span, 0.5 * span);
        self.rules[RuleLabel::MuchHigher as usize].reset(0.3 * span, span, span);
    }

    /// Fails on the first rule whose antecedent is out of order.
    pub fn validate(&self) -> Result<(), RuleError> {
        match self.rules.iter().find(|r| !r.validate()) {
            Some(r) => {
                let s = r.shape();
                Err(RuleError::InvalidShape {
                    rule: r.label().name(),
                    a: s.a,
                    b: s.b,
                    c: s.c,
                })
            }
            None => Ok(()),
        }
    }

    pub fn rules(&self) -> &[TsRule] {
        &self.rules
    }

    pub fn get(&self, label: RuleLabel) -> &TsRule {
        &self.rules[label as usize]
    }

    pub fn shapes(&self) -> [TriangleShape; RuleLabel::COUNT] {
        self.rules.map(|r| r.shape())
    }
}

//! Takagi-Sugeno inference, single input variable.
//!
//! Every rule fires with strength `w_i = rule.evaluate(x)` and contributes
//! `y_i = rule.rate_of(w_i)`.  The crisp output is the weighted average
//! `Σ w_i·y_i / Σ w_i`.  When nothing fires the average is `0/0`; the
//! engine reports that case as a zero rate flagged `degenerate` instead of
//! producing NaN.

use heapless::Vec;
use log::debug;

use super::rule::FuzzyRule;
use crate::error::InferenceError;

/// Upper bound on rules per inference (firing buffer is stack-allocated).
pub const MAX_RULES: usize = 8;

/// Result of one inference pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// Signed actuation rate.  Always finite.
    pub rate: f32,
    /// Firing strength per rule, in input order.  Invalid rules read 0.
    pub strengths: Vec<f32, MAX_RULES>,
    /// True when no rule fired and `rate` was forced to 0.
    pub degenerate: bool,
}

/// Weighted-average TS combiner.
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceEngine;

impl InferenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Combine `rules` for crisp input `x`.  Rule order does not matter.
    pub fn infer<R: FuzzyRule>(&self, x: f32, rules: &[R]) -> Result<Inference, InferenceError> {
        if rules.is_empty() {
            return Err(InferenceError::EmptyRuleSet);
        }
        if rules.len() > MAX_RULES {
            return Err(InferenceError::TooManyRules(rules.len()));
        }
        if !x.is_finite() {
            return Err(InferenceError::NonFiniteInput);
        }

        let mut strengths: Vec<f32, MAX_RULES> = Vec::new();
        let mut weighted = 0.0f32;
        let mut total = 0.0f32;

        for rule in rules {
            let w = if rule.validate() { rule.evaluate(x) } else { 0.0 };
            // Unbounded shapes can yield inf/inf; treat that as not firing.
            let w = if w.is_finite() { w } else { 0.0 };
            weighted += w * rule.rate_of(w);
            total += w;
            // Length checked against MAX_RULES above.
            let _ = strengths.push(w);
        }

        if total <= 0.0 {
            debug!("inference: no rule fired at x={:.3}, rate forced to 0", x);
            return Ok(Inference {
                rate: 0.0,
                strengths,
                degenerate: true,
            });
        }

        let rate = weighted / total;
        debug!(
            "inference: x={:.3} strengths={:?} rate={:.4}",
            x, strengths, rate
        );
        Ok(Inference {
            rate,
            strengths,
            degenerate: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Band;
    use crate::control::membership::TriangleShape;
    use crate::control::rule::{LinearConsequent, RuleLabel, RuleSet, TsRule};

    fn scenario_set() -> RuleSet {
        RuleSet::new(Band::new(40.0, 100.0), Band::new(-2.0, 2.0))
    }

    #[test]
    fn empty_rule_set_is_an_error() {
        let rules: [TsRule; 0] = [];
        assert_eq!(
            InferenceEngine::new().infer(1.0, &rules),
            Err(InferenceError::EmptyRuleSet)
        );
    }

    #[test]
    fn error_in_higher_wedge_heats() {
        // target 70, current 60 -> error +10 -> Higher fires at 0.5 alone.
        let set = scenario_set();
        let out = InferenceEngine::new().infer(10.0, set.rules()).unwrap();
        assert!(!out.degenerate);
        assert!((out.strengths[RuleLabel::Higher as usize] - 0.5).abs() < 1e-6);
        assert!((out.rate - 1.25).abs() < 1e-5);
    }

    #[test]
    fn zero_error_yields_zero_rate() {
        let set = scenario_set();
        let out = InferenceEngine::new().infer(0.0, set.rules()).unwrap();
        assert_eq!(out.rate, 0.0);
        assert_eq!(out.strengths[RuleLabel::Acceptable as usize], 1.0);
    }

    #[test]
    fn nothing_firing_is_degenerate_zero() {
        // Exactly at the acceptance foot: Lower ends there, Acceptable starts at 0.
        let set = scenario_set();
        let out = InferenceEngine::new().infer(-2.0, set.rules()).unwrap();
        assert!(out.degenerate);
        assert_eq!(out.rate, 0.0);
        assert!(out.rate.is_finite());
    }

    #[test]
    fn large_negative_error_cools() {
        let set = scenario_set();
        let out = InferenceEngine::new().infer(-50.0, set.rules()).unwrap();
        assert!(out.rate < 0.0);
    }

    #[test]
    fn invalid_rules_do_not_fire() {
        let bad = TsRule::new(
            RuleLabel::Higher,
            TriangleShape::new(5.0, 1.0, 6.0),
            LinearConsequent::new(100.0, 0.0),
        );
        let good = TsRule::new(
            RuleLabel::Acceptable,
            TriangleShape::new(-1.0, 0.0, 1.0),
            LinearConsequent::new(0.0, 3.0),
        );
        let out = InferenceEngine::new().infer(0.0, &[bad, good]).unwrap();
        assert_eq!(out.strengths[0], 0.0);
        assert_eq!(out.rate, 3.0);
    }

    #[test]
    fn order_does_not_matter() {
        let set = scenario_set();
        let mut reversed: std::vec::Vec<TsRule> = set.rules().to_vec();
        reversed.reverse();
        let engine = InferenceEngine::new();
        for x in [-55.0, -25.0, -10.0, 0.5, 12.0, 25.0, 45.0] {
            let a = engine.infer(x, set.rules()).unwrap().rate;
            let b = engine.infer(x, &reversed).unwrap().rate;
            assert!((a - b).abs() < 1e-5, "x={x}: {a} vs {b}");
        }
    }

    #[test]
    fn nan_input_is_rejected() {
        let set = scenario_set();
        assert_eq!(
            InferenceEngine::new().infer(f32::NAN, set.rules()),
            Err(InferenceError::NonFiniteInput)
        );
    }
}

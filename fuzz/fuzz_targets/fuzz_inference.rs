//! Fuzz target: `InferenceEngine::infer` over arbitrary rule placements
//!
//! Builds the five-rule base from fuzzer-chosen world and acceptance
//! ranges, then infers on a fuzzer-chosen error.  The engine must never
//! panic or return NaN, whatever the shapes look like.
//!
//! cargo fuzz run fuzz_inference

#![no_main]

use fuzzytherm::config::Band;
use fuzzytherm::control::inference::InferenceEngine;
use fuzzytherm::control::rule::RuleSet;
use libfuzzer_sys::fuzz_target;

fn f32_at(data: &[u8], i: usize) -> f32 {
    let mut b = [0u8; 4];
    for (k, slot) in b.iter_mut().enumerate() {
        *slot = data.get(i * 4 + k).copied().unwrap_or(0);
    }
    f32::from_le_bytes(b)
}

fuzz_target!(|data: &[u8]| {
    let world = Band::new(f32_at(data, 0), f32_at(data, 1));
    let acceptance = Band::new(f32_at(data, 2), f32_at(data, 3));
    let error = f32_at(data, 4);

    let rules = RuleSet::new(world, acceptance);
    let engine = InferenceEngine::new();
    if let Ok(out) = engine.infer(error, rules.rules()) {
        assert!(!out.rate.is_nan(), "inference produced NaN");
        if out.degenerate {
            assert_eq!(out.rate, 0.0);
        }
    }
});

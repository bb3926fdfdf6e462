//! Fuzzy control core: membership shapes, TS rules, and the inference engine.

pub mod inference;
pub mod membership;
pub mod rule;

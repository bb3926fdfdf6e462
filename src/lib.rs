//! Fuzzy climate controller library.
//!
//! A Takagi-Sugeno fuzzy inference engine driving a single fan to bring a
//! simulated room temperature to a target.  Exposes the pure-logic
//! modules for integration testing and for the host simulation binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod plant;
pub mod scheduler;

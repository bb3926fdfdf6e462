//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the orchestration for the fuzzy climate
//! controller: FSM ticking, configuration commits, and event publishing.
//! All interaction with the fan and the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;

//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to        |
//! |------------|------------|--------------------|
//! | `log_sink` | EventSink  | `log` facade       |
//!
//! Fan adapters live in [`crate::drivers::fan`].

pub mod log_sink;

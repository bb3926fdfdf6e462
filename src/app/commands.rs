//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (a settings
//! screen, a test harness, the simulation driver) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::ConfigUpdate;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Commit a batch of configuration changes atomically, then recheck.
    Configure(ConfigUpdate),

    /// Re-run evaluation now, pre-empting any episode in flight.
    Recheck,

    /// Overwrite the plant temperature (clamped to the world range).
    SetTemperature(f32),
}

//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade.  The host binary routes those records to
//! stderr via `tracing-subscriber`; a display or dashboard adapter would
//! implement the same trait.

use log::{debug, info, trace, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as a one-line record.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} ({:.1}s) mode={:?} | T={:.2} target={:.2} | fan={:+.3} | \
                     rate={} | fluct={}/{}",
                    t.state,
                    t.secs_in_state,
                    t.mode,
                    t.current_temperature,
                    t.target_temperature,
                    t.fan_speed,
                    t.last_rate
                        .map_or_else(|| "-".to_string(), |r| format!("{r:+.3}")),
                    if t.fluctuation_allowed { "on" } else { "off" },
                    if t.fluctuation_active { "active" } else { "held" },
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::TemperatureChanged(t) => {
                trace!("TEMP  | {:.3}", t);
            }
            AppEvent::Inferred {
                error,
                rate,
                degenerate,
            } => {
                debug!(
                    "INFER | error={:+.2} rate={:+.3}{}",
                    error,
                    rate,
                    if *degenerate { " (no rule fired)" } else { "" }
                );
            }
            AppEvent::InferenceRejected(e) => {
                warn!("INFER | rejected: {e}");
            }
            AppEvent::ActuatorFault(e) => {
                warn!("FAULT | {e}");
            }
            AppEvent::Converged { temperature } => {
                info!("DONE  | reached {:.2}", temperature);
            }
            AppEvent::ConfigCommitted => {
                info!("CONFIG| committed");
            }
            AppEvent::ConfigRejected(e) => {
                warn!("CONFIG| rejected: {e}");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}

//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM and its shared context (plant, rule base,
//! timers).  It exposes a clean, hardware-agnostic API.  The fan and the
//! event sink are injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  AppCommand ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                 │        AppService        │
//!     FanPort ◀──▶│  FSM · Plant · RuleSet   │
//!                 └─────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{Band, ConfigUpdate, SystemConfig};
use crate::control::inference::Inference;
use crate::control::membership::TriangleShape;
use crate::control::rule::RuleLabel;
use crate::error::ConfigError;
use crate::fsm::context::{FanCommand, FsmContext, Notice};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::scheduler::Countdown;

use super::commands::AppCommand;
use super::events::{AppEvent, ClimateMode, Telemetry};
use super::ports::{EventSink, FanPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    telemetry_timer: Countdown,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        Ok(Self {
            fsm,
            ctx,
            telemetry_timer: Countdown::new("telemetry"),
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Idle with a fresh check interval.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.fsm.take_transitions();
        self.arm_telemetry();
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "AppService started in {:?} at {:.2} (target {:.2})",
            self.fsm.current_state(),
            self.ctx.plant.temperature(),
            self.ctx.plant.target()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: fan feedback → plant → FSM → fan
    /// commands → events.
    pub fn tick(&mut self, fan: &mut impl FanPort, sink: &mut impl EventSink) {
        self.tick_count += 1;
        let dt = self.ctx.tick_period_secs;

        // 1. Fan feedback
        self.ctx.fan = fan.poll(dt);

        // 2. Ambient fluctuation (dormant while actuating)
        self.ctx.plant.tick(dt);

        // 3. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 4. Apply fan commands and publish what happened
        self.flush(fan, sink);

        // 5. Telemetry
        if self.telemetry_timer.tick(dt) {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
            self.arm_telemetry();
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  Failures are reported through the
    /// sink; nothing here panics.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        fan: &mut impl FanPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Configure(update) => {
                // Rejection is already published as `ConfigRejected`.
                let _ = self.commit(&update, fan, sink);
            }
            AppCommand::Recheck => self.recheck(fan, sink),
            AppCommand::SetTemperature(t) => {
                self.ctx.plant.set_temperature(t);
                self.flush(fan, sink);
            }
        }
    }

    /// Apply a configuration batch atomically.
    ///
    /// On success the new ranges and policy take effect, dependent values
    /// are re-clamped and a [`recheck`](Self::recheck) runs.  On failure
    /// nothing changes.
    pub fn commit(
        &mut self,
        update: &ConfigUpdate,
        fan: &mut impl FanPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        let candidate = update
            .apply_to(&self.ctx.config)
            .and_then(|c| c.validate().map(|()| c));
        let next = match candidate {
            Ok(c) => c,
            Err(e) => {
                warn!("Configuration rejected: {e}");
                sink.emit(&AppEvent::ConfigRejected(e));
                return Err(e);
            }
        };

        self.ctx.plant.apply_config(&next);
        self.ctx.config = next;
        info!(
            "Configuration committed: world [{:.1}, {:.1}], target {:.2}, acceptance [{:.1}, {:.1}]",
            self.ctx.config.world_range.min,
            self.ctx.config.world_range.max,
            self.ctx.plant.target(),
            self.ctx.config.acceptance_range.min,
            self.ctx.config.acceptance_range.max
        );
        sink.emit(&AppEvent::ConfigCommitted);
        self.recheck(fan, sink);
        Ok(())
    }

    /// Force an evaluation now.  An episode in flight is torn down first
    /// (fan ramps to zero, fluctuation resumes, progress is kept).
    pub fn recheck(&mut self, fan: &mut impl FanPort, sink: &mut impl EventSink) {
        self.fsm.force_transition(StateId::Evaluating, &mut self.ctx);
        self.flush(fan, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> Telemetry {
        Telemetry {
            state: self.state(),
            secs_in_state: self.secs_in_state(),
            mode: self.mode(),
            current_temperature: self.current_temperature(),
            target_temperature: self.target_temperature(),
            fluctuation_allowed: self.fluctuation_allowed(),
            fluctuation_active: self.ctx.plant.fluctuation_active(),
            fan_speed: self.ctx.fan.speed,
            last_rate: self.ctx.last_inference.as_ref().map(|i| i.rate),
            antecedents: self.antecedents(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Seconds elapsed since the FSM entered its current state.
    pub fn secs_in_state(&self) -> f32 {
        self.fsm.ticks_in_current_state() as f32 * self.ctx.tick_period_secs
    }

    /// Heating or cooling while an episode runs, otherwise `Off`.
    pub fn mode(&self) -> ClimateMode {
        self.ctx
            .episode
            .map_or(ClimateMode::Off, |e| ClimateMode::from_rate(e.rate))
    }

    pub fn current_temperature(&self) -> f32 {
        self.ctx.plant.temperature()
    }

    pub fn target_temperature(&self) -> f32 {
        self.ctx.plant.target()
    }

    pub fn world_range(&self) -> Band {
        self.ctx.plant.range()
    }

    pub fn acceptance_range(&self) -> Band {
        self.ctx.config.acceptance_range
    }

    pub fn fluctuation_allowed(&self) -> bool {
        self.ctx.plant.fluctuation_enabled()
    }

    pub fn fluctuation_active(&self) -> bool {
        self.ctx.plant.fluctuation_active()
    }

    /// Outcome of the most recent successful inference.
    pub fn last_inference(&self) -> Option<&Inference> {
        self.ctx.last_inference.as_ref()
    }

    /// Antecedent shapes as of the last evaluation.
    pub fn antecedents(&self) -> [(RuleLabel, TriangleShape); RuleLabel::COUNT] {
        let rules = self.ctx.rules.rules();
        core::array::from_fn(|i| (rules[i].label(), rules[i].shape()))
    }

    /// Live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate FSM outputs into port calls and events.
    fn flush(&mut self, fan: &mut impl FanPort, sink: &mut impl EventSink) {
        for cmd in core::mem::take(&mut self.ctx.commands) {
            match cmd {
                FanCommand::RampTo { speed, secs } => fan.ramp_to(speed, secs),
                FanCommand::Stop => fan.stop(),
            }
        }

        for notice in core::mem::take(&mut self.ctx.notices) {
            let event = match notice {
                Notice::Inferred {
                    error,
                    rate,
                    degenerate,
                } => AppEvent::Inferred {
                    error,
                    rate,
                    degenerate,
                },
                Notice::Rejected(e) => AppEvent::InferenceRejected(e),
                Notice::ActuatorFault(e) => AppEvent::ActuatorFault(e),
                Notice::Converged { temperature } => AppEvent::Converged { temperature },
            };
            sink.emit(&event);
        }

        for t in self.fsm.take_transitions() {
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
            });
        }

        if let Some(t) = self.ctx.plant.take_changed() {
            sink.emit(&AppEvent::TemperatureChanged(t));
        }
    }

    fn arm_telemetry(&mut self) {
        let secs = self.ctx.config.telemetry_interval_secs;
        if secs > 0 {
            self.telemetry_timer.arm(secs as f32);
        }
    }
}

//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the plant, the rule base, the check and ramp timers, the latest
//! fan feedback, and the outbound fan commands and notices the service
//! drains after each tick.  Think of it as the "blackboard" in a blackboard
//! architecture.

use heapless::Vec;

use crate::app::ports::FanFeedback;
use crate::config::SystemConfig;
use crate::control::inference::{Inference, InferenceEngine};
use crate::control::rule::RuleSet;
use crate::error::{ActuatorError, Error, InferenceError, Result};
use crate::plant::Plant;
use crate::scheduler::Countdown;

/// Capacity of the per-tick command and notice queues.
const QUEUE_CAP: usize = 4;

// ---------------------------------------------------------------------------
// Fan commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FanCommand {
    /// Ramp to a signed speed over the given seconds.
    RampTo { speed: f32, secs: f32 },
    /// Cut drive immediately.
    Stop,
}

// ---------------------------------------------------------------------------
// Notices (written by state handlers; turned into events by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// An inference pass completed.
    Inferred { error: f32, rate: f32, degenerate: bool },
    /// Evaluation refused to arm actuation.
    Rejected(Error),
    /// The fan misbehaved during an episode.
    ActuatorFault(ActuatorError),
    /// The plant reached the target.
    Converged { temperature: f32 },
}

// ---------------------------------------------------------------------------
// Actuation episode
// ---------------------------------------------------------------------------

/// State of the single in-flight actuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    /// Signed rate applied to the plant per second.
    pub rate: f32,
    /// `sign(current - target)` at the start of the episode.
    pub direction: f32,
    /// Fan has confirmed it reached `rate`.
    pub ramp_confirmed: bool,
}

impl Episode {
    /// True while the plant has not yet reached the target in the direction
    /// of travel.
    pub fn short_of(&self, current: f32, target: f32) -> bool {
        self.direction * current > self.direction * target
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Duration of one tick in seconds.
    pub tick_period_secs: f32,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Plant and rules --
    pub plant: Plant,
    pub rules: RuleSet,
    pub engine: InferenceEngine,
    /// Outcome of the most recent successful inference.
    pub last_inference: Option<Inference>,
    /// Rate handed from Evaluating to its transition decision.
    pub evaluation: Option<Result<f32>>,

    // -- Timers --
    /// Periodic check while idle.
    pub check_timer: Countdown,
    /// Ramp supervision while actuating.
    pub ramp_timer: Countdown,

    // -- Actuator --
    /// Latest fan feedback.  Updated before each FSM tick.
    pub fan: FanFeedback,
    /// Episode in flight, if actuating.
    pub episode: Option<Episode>,
    /// Fault that ended the current episode; exit handler stops the fan hard.
    pub actuator_fault: Option<ActuatorError>,

    // -- Outputs --
    /// Fan commands to apply after the FSM tick, in order.
    pub commands: Vec<FanCommand, QUEUE_CAP>,
    /// Notices to publish after the FSM tick, in order.
    pub notices: Vec<Notice, QUEUE_CAP>,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        let plant = Plant::new(&config);
        let rules = RuleSet::new(config.world_range, config.acceptance_range);
        Self {
            tick_period_secs: config.tick_secs(),
            plant,
            rules,
            engine: InferenceEngine::new(),
            last_inference: None,
            evaluation: None,
            check_timer: Countdown::new("check"),
            ramp_timer: Countdown::new("ramp"),
            fan: FanFeedback::default(),
            episode: None,
            actuator_fault: None,
            commands: Vec::new(),
            notices: Vec::new(),
            config,
        }
    }

    /// Queue a fan command.  A full queue keeps the newest command.
    pub fn command(&mut self, cmd: FanCommand) {
        if let Err(cmd) = self.commands.push(cmd) {
            if let Some(last) = self.commands.last_mut() {
                *last = cmd;
            }
        }
    }

    /// Queue a notice.  A full queue drops the oldest.
    pub fn notify(&mut self, notice: Notice) {
        if self.notices.is_full() {
            self.notices.remove(0);
        }
        let _ = self.notices.push(notice);
    }

    /// Rebuild antecedents and run one inference on the current error.
    ///
    /// Returns the rate to actuate with (0 means nothing to do).
    pub fn evaluate(&mut self) -> Result<f32> {
        self.rules
            .recompute(self.config.world_range, self.config.acceptance_range);
        if let Err(e) = self.rules.validate() {
            self.last_inference = None;
            return Err(e.into());
        }

        let error = self.plant.error();
        let inference = self.engine.infer(error, self.rules.rules())?;
        let rate = inference.rate;
        self.notify(Notice::Inferred {
            error,
            rate,
            degenerate: inference.degenerate,
        });
        self.last_inference = Some(inference);

        // `signum(0.0)` is 1.0, so a zero error needs its own check.
        if rate != 0.0 && (error == 0.0 || rate.signum() != error.signum()) {
            return Err(InferenceError::DirectionMismatch { rate, error }.into());
        }
        Ok(rate)
    }
}

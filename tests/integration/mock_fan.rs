//! Mock adapters for integration tests.
//!
//! Records every fan call and every emitted event so tests can assert on
//! the full history without a real PWM channel.

use fuzzytherm::app::events::AppEvent;
use fuzzytherm::app::ports::{EventSink, FanFeedback, FanPort};
use fuzzytherm::app::service::AppService;
use fuzzytherm::config::SystemConfig;
use fuzzytherm::fsm::StateId;

// ── Fan call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FanCall {
    RampTo { speed: f32, secs: f32 },
    Stop,
}

// ── MockFan ───────────────────────────────────────────────────

/// A fan that either reaches every commanded speed on the next poll, or
/// (when stalled) never does.
pub struct MockFan {
    pub calls: Vec<FanCall>,
    pub stalled: bool,
    speed: f32,
    target: f32,
}

#[allow(dead_code)]
impl MockFan {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            stalled: false,
            speed: 0.0,
            target: 0.0,
        }
    }

    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::new()
        }
    }

    pub fn last_call(&self) -> Option<&FanCall> {
        self.calls.last()
    }

    /// Signed speeds of every `RampTo`, in order.
    pub fn ramp_targets(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                FanCall::RampTo { speed, .. } => Some(*speed),
                FanCall::Stop => None,
            })
            .collect()
    }
}

impl Default for MockFan {
    fn default() -> Self {
        Self::new()
    }
}

impl FanPort for MockFan {
    fn ramp_to(&mut self, target_speed: f32, ramp_secs: f32) {
        self.calls.push(FanCall::RampTo {
            speed: target_speed,
            secs: ramp_secs,
        });
        self.target = target_speed;
    }

    fn poll(&mut self, _dt_secs: f32) -> FanFeedback {
        if !self.stalled {
            self.speed = self.target;
        }
        FanFeedback {
            speed: self.speed,
            target_speed: self.target,
            ramp_complete: !self.stalled,
            fault: None,
        }
    }

    fn stop(&mut self) {
        self.calls.push(FanCall::Stop);
        self.speed = 0.0;
        self.target = 0.0;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Every `StateChanged` as `(from, to)`.
    pub fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// Default ranges, no ambient noise, deterministic RNG.
pub fn quiet_config() -> SystemConfig {
    SystemConfig {
        fluctuation_allowed: false,
        rng_seed: Some(42),
        ..SystemConfig::default()
    }
}

pub fn started(config: SystemConfig, fan: MockFan) -> (AppService, MockFan, RecordingSink) {
    let mut app = AppService::new(config).expect("test config must be valid");
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, fan, sink)
}

/// Ticks that cover `secs` of simulated time, with one to spare.
pub fn ticks_for(app: &AppService, secs: f32) -> usize {
    (secs / app.config().tick_secs()).ceil() as usize + 1
}

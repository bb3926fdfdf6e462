//! Integration tests for the AppService → FSM → fan pipeline.
//!
//! These run on the host and drive the full control loop against the
//! recording mock fan, asserting on fan calls and published events.

use fuzzytherm::app::commands::AppCommand;
use fuzzytherm::app::events::{AppEvent, ClimateMode};
use fuzzytherm::config::{ConfigUpdate, SystemConfig};
use fuzzytherm::fsm::StateId;

use crate::mock_fan::{FanCall, MockFan, quiet_config, started, ticks_for};

fn at(initial: f32) -> SystemConfig {
    SystemConfig {
        initial_temperature: initial,
        ..quiet_config()
    }
}

// ── Heating below target ──────────────────────────────────────

#[test]
fn heating_episode_rises_monotonically_to_target() {
    let (mut app, mut fan, mut sink) = started(at(60.0), MockFan::new());

    for _ in 0..ticks_for(&app, app.config().check_interval_secs) {
        app.tick(&mut fan, &mut sink);
        if app.state() == StateId::Actuating {
            break;
        }
    }
    assert_eq!(app.state(), StateId::Actuating);
    assert_eq!(
        sink.transitions(),
        vec![
            (StateId::Idle, StateId::Evaluating),
            (StateId::Evaluating, StateId::Actuating),
        ]
    );
    let targets = fan.ramp_targets();
    assert_eq!(targets.len(), 1);
    assert!((targets[0] - 1.25).abs() < 1e-4, "rate was {}", targets[0]);
    assert_eq!(app.mode(), ClimateMode::Heating);
    assert!(!app.fluctuation_active());

    let mut last = app.current_temperature();
    let mut guard = 0;
    while app.state() == StateId::Actuating {
        app.tick(&mut fan, &mut sink);
        let t = app.current_temperature();
        assert!(t > last, "temperature fell from {last} to {t}");
        last = t;
        guard += 1;
        assert!(guard < 1_000, "episode never converged");
    }

    assert!(app.current_temperature() >= 70.0);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.mode(), ClimateMode::Off);
    assert!(app.fluctuation_active());
    assert_eq!(
        fan.last_call(),
        Some(&FanCall::RampTo {
            speed: 0.0,
            secs: app.config().fan_ramp_secs
        })
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Converged { .. })),
        1
    );
}

// ── Cooling above target ──────────────────────────────────────

#[test]
fn cooling_episode_falls_to_target() {
    let (mut app, mut fan, mut sink) = started(at(90.0), MockFan::new());
    app.recheck(&mut fan, &mut sink);
    assert_eq!(app.state(), StateId::Actuating);
    assert_eq!(app.mode(), ClimateMode::Cooling);
    assert!(fan.ramp_targets()[0] < 0.0);

    for _ in 0..2_000 {
        app.tick(&mut fan, &mut sink);
        if app.state() == StateId::Idle {
            break;
        }
    }
    assert_eq!(app.state(), StateId::Idle);
    assert!(app.current_temperature() <= 70.0);
    assert!(app.current_temperature() > 65.0);
}

// ── At target ─────────────────────────────────────────────────

#[test]
fn at_target_never_commands_the_fan() {
    let (mut app, mut fan, mut sink) = started(at(70.0), MockFan::new());
    for _ in 0..ticks_for(&app, 20.0) {
        app.tick(&mut fan, &mut sink);
        assert_eq!(app.state(), StateId::Idle);
    }
    assert!(fan.calls.is_empty());

    let inferred: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Inferred { rate, .. } => Some(*rate),
            _ => None,
        })
        .collect();
    assert!(inferred.len() >= 3);
    assert!(inferred.iter().all(|r| *r == 0.0));
}

#[test]
fn inside_acceptance_band_is_degenerate_and_idle() {
    let (mut app, mut fan, mut sink) = started(at(72.0), MockFan::new());
    app.recheck(&mut fan, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert!(fan.calls.is_empty());
    assert!(app.last_inference().is_some_and(|i| i.degenerate && i.rate == 0.0));
}

// ── Pre-emption by a commit ───────────────────────────────────

#[test]
fn commit_mid_episode_preempts_without_leftover_timers() {
    let (mut app, mut fan, mut sink) = started(at(60.0), MockFan::stalled());
    app.recheck(&mut fan, &mut sink);
    assert_eq!(app.state(), StateId::Actuating);
    for _ in 0..10 {
        app.tick(&mut fan, &mut sink);
    }
    let progress = app.current_temperature();
    assert!(progress > 60.0);

    fan.calls.clear();
    sink.clear();
    app.handle_command(
        AppCommand::Configure(ConfigUpdate::new().target(62.0)),
        &mut fan,
        &mut sink,
    );

    // Episode torn down, partial progress kept, nothing left to do.
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.current_temperature(), progress);
    assert_eq!(fan.ramp_targets(), vec![0.0]);
    assert!(app.fluctuation_active());
    assert_eq!(
        sink.transitions(),
        vec![
            (StateId::Actuating, StateId::Evaluating),
            (StateId::Evaluating, StateId::Idle),
        ]
    );

    // The cancelled ramp supervision must never fire.
    for _ in 0..ticks_for(&app, 30.0) {
        app.tick(&mut fan, &mut sink);
    }
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorFault(_))),
        0
    );
    assert_eq!(fan.calls.len(), 1);
    assert_eq!(app.state(), StateId::Idle);
}

// ── Recheck ───────────────────────────────────────────────────

#[test]
fn consecutive_rechecks_are_idempotent() {
    let (mut app, mut fan, mut sink) = started(at(60.0), MockFan::new());

    app.recheck(&mut fan, &mut sink);
    let shapes = app.antecedents();
    let rate = app.last_inference().map(|i| i.rate);

    app.recheck(&mut fan, &mut sink);
    assert_eq!(app.antecedents(), shapes);
    assert_eq!(app.last_inference().map(|i| i.rate), rate);

    let targets = fan.ramp_targets();
    assert_eq!(targets.len(), 3);
    assert_eq!(targets[0], targets[2]);
    assert_eq!(targets[1], 0.0);
    assert_eq!(app.state(), StateId::Actuating);
}

#[test]
fn recheck_from_idle_restarts_check_interval() {
    let (mut app, mut fan, mut sink) = started(at(70.0), MockFan::new());
    let inferred = |sink: &crate::mock_fan::RecordingSink| {
        sink.count(|e| matches!(e, AppEvent::Inferred { .. }))
    };

    for _ in 0..40 {
        app.tick(&mut fan, &mut sink);
    }
    app.handle_command(AppCommand::Recheck, &mut fan, &mut sink);
    assert_eq!(inferred(&sink), 1);

    for _ in 0..40 {
        app.tick(&mut fan, &mut sink);
    }
    assert_eq!(inferred(&sink), 1, "old interval must not carry over");

    for _ in 0..11 {
        app.tick(&mut fan, &mut sink);
    }
    assert_eq!(inferred(&sink), 2);
}

// ── Actuator supervision ──────────────────────────────────────

#[test]
fn stalled_fan_times_out_and_stops() {
    let config = SystemConfig {
        ramp_timeout_secs: 2.0,
        ..at(60.0)
    };
    let (mut app, mut fan, mut sink) = started(config, MockFan::stalled());
    app.recheck(&mut fan, &mut sink);
    assert_eq!(app.state(), StateId::Actuating);

    for _ in 0..ticks_for(&app, 2.0) {
        app.tick(&mut fan, &mut sink);
    }

    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(fan.last_call(), Some(&FanCall::Stop));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorFault(_))),
        1
    );
    assert!(app.current_temperature() > 60.0, "partial progress is kept");
    assert!(app.fluctuation_active());
}

// ── Manual temperature ────────────────────────────────────────

#[test]
fn set_temperature_is_clamped_and_published() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    app.handle_command(AppCommand::SetTemperature(-40.0), &mut fan, &mut sink);
    assert_eq!(app.current_temperature(), 40.0);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::TemperatureChanged(40.0))
    );
    // Setting the temperature does not evaluate by itself.
    assert_eq!(app.state(), StateId::Idle);
    assert!(fan.calls.is_empty());
}

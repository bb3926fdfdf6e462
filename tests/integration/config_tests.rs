//! Integration tests for batched configuration commits.

use fuzzytherm::app::commands::AppCommand;
use fuzzytherm::app::events::AppEvent;
use fuzzytherm::config::{Band, ConfigUpdate};
use fuzzytherm::error::{ConfigError, RuleError};
use fuzzytherm::fsm::StateId;

use crate::mock_fan::{MockFan, quiet_config, started};

#[test]
fn world_range_is_clamped_to_absolute_bounds() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    app.commit(&ConfigUpdate::new().world_range(-500.0, 500.0), &mut fan, &mut sink)
        .expect("clamped range is valid");
    assert_eq!(app.world_range(), Band::new(-100.0, 200.0));
    assert!(sink.events.contains(&AppEvent::ConfigCommitted));
}

#[test]
fn acceptance_range_is_clamped_per_side() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    app.commit(&ConfigUpdate::new().acceptance_range(-20.0, 20.0), &mut fan, &mut sink)
        .expect("clamped acceptance is valid");
    assert_eq!(app.acceptance_range(), Band::new(-10.0, 10.0));
}

#[test]
fn narrowing_world_reclamps_target_and_current() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    app.commit(&ConfigUpdate::new().world_range(20.0, 50.0), &mut fan, &mut sink)
        .expect("valid range");
    assert_eq!(app.target_temperature(), 50.0);
    assert_eq!(app.current_temperature(), 50.0);
    assert!(sink.events.contains(&AppEvent::TemperatureChanged(50.0)));
    // Both clamped to the same edge, so there is nothing to do.
    assert_eq!(app.state(), StateId::Idle);
    assert!(fan.calls.is_empty());
}

#[test]
fn target_is_clamped_into_new_world_range_in_same_batch() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    let update = ConfigUpdate::new().world_range(0.0, 60.0).target(90.0);
    app.commit(&update, &mut fan, &mut sink).expect("valid batch");
    assert_eq!(app.target_temperature(), 60.0);
}

#[test]
fn invalid_batch_is_rejected_atomically() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    let before = app.config().clone();

    // Valid world change, but the wait range is inverted: nothing applies.
    let update = ConfigUpdate::new()
        .world_range(0.0, 150.0)
        .fluctuation_wait_range(50.0, 10.0);
    let err = app.commit(&update, &mut fan, &mut sink).unwrap_err();

    assert!(matches!(
        err,
        ConfigError::InvertedRange {
            field: "fluctuation_wait_range",
            ..
        }
    ));
    assert_eq!(app.config(), &before);
    assert_eq!(app.world_range(), before.world_range);
    assert_eq!(sink.events.last(), Some(&AppEvent::ConfigRejected(err)));
}

#[test]
fn non_finite_target_is_rejected() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    let err = app
        .commit(&ConfigUpdate::new().target(f32::NAN), &mut fan, &mut sink)
        .unwrap_err();
    assert_eq!(err, ConfigError::NotFinite("target_temperature"));
    assert_eq!(app.target_temperature(), 70.0);
}

#[test]
fn oversized_acceptance_band_is_rejected() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    let before = app.config().clone();
    // span 20 -> 0.3*span = 6, so an 8-wide half band breaks the Lower shape.
    let update = ConfigUpdate::new()
        .world_range(40.0, 60.0)
        .acceptance_range(-8.0, 8.0)
        .target(40.0);
    let err = app.commit(&update, &mut fan, &mut sink).unwrap_err();

    assert!(matches!(
        err,
        ConfigError::RuleShape(RuleError::InvalidShape { rule: "Lower", .. })
    ));
    assert_eq!(app.config(), &before);
    assert_eq!(sink.events.last(), Some(&AppEvent::ConfigRejected(err)));
    assert!(!sink.events.contains(&AppEvent::ConfigCommitted));
    assert_eq!(app.state(), StateId::Idle);
    assert!(fan.calls.is_empty());
}

#[test]
fn narrow_world_with_default_acceptance_is_rejected_and_control_continues() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    let before = app.config().clone();
    let err = app
        .commit(
            &ConfigUpdate::new().world_range(40.0, 45.0).target(45.0),
            &mut fan,
            &mut sink,
        )
        .unwrap_err();
    assert!(matches!(err, ConfigError::RuleShape(_)));
    assert_eq!(app.config(), &before);
    assert_eq!(app.world_range(), before.world_range);

    // The previous ranges still drive the fan.
    app.handle_command(AppCommand::SetTemperature(60.0), &mut fan, &mut sink);
    app.handle_command(AppCommand::Recheck, &mut fan, &mut sink);
    assert_eq!(app.state(), StateId::Actuating);
    assert!(!fan.ramp_targets().is_empty());
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::InferenceRejected(_))));
}

#[test]
fn disabling_fluctuation_is_reported() {
    let config = fuzzytherm::config::SystemConfig {
        fluctuation_allowed: true,
        ..quiet_config()
    };
    let (mut app, mut fan, mut sink) = started(config, MockFan::new());
    assert!(app.fluctuation_allowed());
    app.commit(&ConfigUpdate::new().fluctuation_allowed(false), &mut fan, &mut sink)
        .expect("valid");
    assert!(!app.fluctuation_allowed());
    assert!(!app.build_telemetry().fluctuation_allowed);
}

#[test]
fn commit_rebuilds_antecedents_from_new_span() {
    let (mut app, mut fan, mut sink) = started(quiet_config(), MockFan::new());
    app.commit(&ConfigUpdate::new().world_range(0.0, 100.0), &mut fan, &mut sink)
        .expect("valid");
    let shapes = app.antecedents();
    // MuchHigher peaks at +span.
    let (_, much_higher) = shapes[4];
    assert!((much_higher.a - 30.0).abs() < 1e-3);
    assert_eq!((much_higher.b, much_higher.c), (100.0, 100.0));
}

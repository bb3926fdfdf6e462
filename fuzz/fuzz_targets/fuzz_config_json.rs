//! Fuzz target: JSON configuration → `AppService`
//!
//! Parses arbitrary bytes as a `SystemConfig` and, when both parsing and
//! validation succeed, runs the controller for a few simulated seconds.
//! Nothing may panic and the plant must stay inside the world range.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use fuzzytherm::app::events::AppEvent;
use fuzzytherm::app::ports::EventSink;
use fuzzytherm::app::service::AppService;
use fuzzytherm::config::SystemConfig;
use fuzzytherm::drivers::fan::SimFan;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };
    // Keep runs short and reproducible.
    config.rng_seed = Some(0);
    config.tick_period_ms = config.tick_period_ms.clamp(1, 1_000);

    let Ok(mut app) = AppService::new(config) else {
        return;
    };
    let world = app.world_range();
    let mut fan = SimFan::new();
    let mut sink = Discard;
    app.start(&mut sink);
    app.recheck(&mut fan, &mut sink);
    for _ in 0..200 {
        app.tick(&mut fan, &mut sink);
        let t = app.current_temperature();
        assert!(t >= world.min && t <= world.max, "plant escaped world range");
    }
});

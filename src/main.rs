//! Fuzzy climate controller: host simulation entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                  │
//! │                                                        │
//! │      SimFan (FanPort)          LogEventSink            │
//! │                                                        │
//! │  ──────────────── Port Trait Boundary ───────────────  │
//! │                                                        │
//! │  ┌──────────────────────────────────────────────────┐  │
//! │  │            AppService (pure logic)               │  │
//! │  │   FSM · Plant · RuleSet · InferenceEngine        │  │
//! │  └──────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `fuzzytherm-sim [CONFIG.json] [SECONDS]`
//!
//! Runs the control loop in simulated time (no sleeping) and logs every
//! event.  Halfway through, the target is raised by five degrees to show
//! a commit pre-empting whatever the controller is doing.
#![deny(unused_must_use)]

use std::env;
use std::fs;

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::EnvFilter;

use fuzzytherm::adapters::log_sink::LogEventSink;
use fuzzytherm::app::commands::AppCommand;
use fuzzytherm::app::events::AppEvent;
use fuzzytherm::app::ports::EventSink;
use fuzzytherm::app::service::AppService;
use fuzzytherm::config::{ConfigUpdate, SystemConfig};
use fuzzytherm::drivers::fan::SimFan;

const DEFAULT_RUN_SECS: f32 = 120.0;
const TARGET_STEP: f32 = 5.0;

fn load_config(path: Option<&str>) -> Result<SystemConfig> {
    let Some(path) = path else {
        return Ok(SystemConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config: SystemConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!("Config loaded from {path}");
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("fuzzytherm-sim v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Arguments and config ───────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let run_secs = match args.get(1) {
        Some(s) => s
            .parse::<f32>()
            .with_context(|| format!("invalid duration {s:?}"))?,
        None => DEFAULT_RUN_SECS,
    };

    // ── 3. Construct adapters and service ─────────────────────
    let mut fan = SimFan::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone()).context("rejected configuration")?;
    app.start(&mut sink);

    // ── 4. Simulated event loop ───────────────────────────────
    let ticks = (run_secs / config.tick_secs()).ceil().max(0.0) as u64;
    let midpoint = ticks / 2;
    for tick in 0..ticks {
        if tick == midpoint {
            let raised = app.target_temperature() + TARGET_STEP;
            info!("Raising target to {raised:.1}");
            let update = ConfigUpdate::new().target(raised);
            app.handle_command(AppCommand::Configure(update), &mut fan, &mut sink);
        }
        app.tick(&mut fan, &mut sink);
    }

    let summary = app.build_telemetry();
    sink.emit(&AppEvent::Telemetry(summary));
    info!(
        "Simulated {:.1}s in {} ticks; final temperature {:.2}",
        run_secs,
        app.tick_count(),
        app.current_temperature()
    );
    Ok(())
}

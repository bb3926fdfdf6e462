//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers over the shared
//! [`FsmContext`](super::context::FsmContext).
//!
//! ```text
//!          ┌──────────────[rate == 0 / rejected]──────────────┐
//!          ▼                                                  │
//!        IDLE ──[check interval elapsed]──▶ EVALUATING ───────┤
//!          ▲                                 (transient)      │
//!          │                                                  │ [rate != 0]
//!          │                                                  ▼
//!          └──────[target reached / ramp fault]────────── ACTUATING
//!
//!  recheck(): any state ──▶ EVALUATING (pre-empts ACTUATING)
//! ```

use super::context::{Episode, FanCommand, FsmContext, Notice};
use super::{StateDescriptor, StateId};
use crate::error::ActuatorError;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            transient: false,
            on_enter: Some(idle_enter),
            on_exit: Some(idle_exit),
            on_update: idle_update,
        },
        // Index 1: Evaluating
        StateDescriptor {
            id: StateId::Evaluating,
            name: "Evaluating",
            transient: true,
            on_enter: Some(evaluating_enter),
            on_exit: None,
            on_update: evaluating_update,
        },
        // Index 2: Actuating
        StateDescriptor {
            id: StateId::Actuating,
            name: "Actuating",
            transient: false,
            on_enter: Some(actuating_enter),
            on_exit: Some(actuating_exit),
            on_update: actuating_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state: waiting for the next periodic check
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    // Always a full fresh interval; a cancelled one is never resumed.
    ctx.check_timer.arm(ctx.config.check_interval_secs);
    debug!(
        "IDLE: next check in {:.1}s at {:.2}",
        ctx.config.check_interval_secs,
        ctx.plant.temperature()
    );
}

fn idle_exit(ctx: &mut FsmContext) {
    ctx.check_timer.cancel();
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.check_timer.tick(ctx.tick_period_secs) {
        return Some(StateId::Evaluating);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  EVALUATING state: rebuild antecedents, run inference
// ═══════════════════════════════════════════════════════════════════════════

fn evaluating_enter(ctx: &mut FsmContext) {
    let outcome = ctx.evaluate();
    ctx.evaluation = Some(outcome);
}

fn evaluating_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.evaluation.take() {
        Some(Ok(rate)) if rate != 0.0 => {
            info!(
                "EVALUATING: error {:+.2} -> rate {:+.3}, actuating",
                ctx.plant.error(),
                rate
            );
            ctx.evaluation = Some(Ok(rate));
            Some(StateId::Actuating)
        }
        Some(Ok(_)) => {
            debug!("EVALUATING: within acceptance, no actuation");
            Some(StateId::Idle)
        }
        Some(Err(e)) => {
            warn!("EVALUATING: {e}; staying idle");
            ctx.notify(Notice::Rejected(e));
            Some(StateId::Idle)
        }
        None => Some(StateId::Idle),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTUATING state: fan running, plant moving towards target
// ═══════════════════════════════════════════════════════════════════════════

fn actuating_enter(ctx: &mut FsmContext) {
    let rate = match ctx.evaluation.take() {
        Some(Ok(rate)) => rate,
        _ => 0.0,
    };
    let direction = (ctx.plant.temperature() - ctx.plant.target()).signum();

    ctx.plant.set_fluctuation_active(false);
    ctx.episode = Some(Episode {
        rate,
        direction,
        ramp_confirmed: false,
    });
    ctx.actuator_fault = None;
    ctx.command(FanCommand::RampTo {
        speed: rate,
        secs: ctx.config.fan_ramp_secs,
    });
    ctx.ramp_timer.arm(ctx.config.ramp_timeout_secs);
    info!(
        "ACTUATING: {:.2} -> {:.2} at {:+.3}/s",
        ctx.plant.temperature(),
        ctx.plant.target(),
        rate
    );
}

fn actuating_exit(ctx: &mut FsmContext) {
    ctx.ramp_timer.cancel();
    ctx.episode = None;
    if ctx.actuator_fault.take().is_some() {
        ctx.command(FanCommand::Stop);
    } else {
        ctx.command(FanCommand::RampTo {
            speed: 0.0,
            secs: ctx.config.fan_ramp_secs,
        });
    }
    ctx.plant.set_fluctuation_active(true);
    info!("ACTUATING: fan winding down at {:.2}", ctx.plant.temperature());
}

fn actuating_update(ctx: &mut FsmContext) -> Option<StateId> {
    let Some(mut episode) = ctx.episode else {
        return Some(StateId::Idle);
    };

    // ── Actuator supervision ─────────────────────────────────
    if let Some(fault) = ctx.fan.fault {
        return Some(abort_episode(ctx, fault));
    }
    if !episode.ramp_confirmed {
        let ours = (ctx.fan.target_speed - episode.rate).abs() <= f32::EPSILON;
        if ours && ctx.fan.ramp_complete {
            episode.ramp_confirmed = true;
            ctx.ramp_timer.cancel();
            debug!("ACTUATING: fan at {:+.3}", ctx.fan.speed);
        } else if ctx.ramp_timer.tick(ctx.tick_period_secs) {
            let fault = ActuatorError::RampTimeout {
                target_speed: episode.rate,
                waited_secs: ctx.config.ramp_timeout_secs,
            };
            return Some(abort_episode(ctx, fault));
        }
    }
    ctx.episode = Some(episode);

    // ── Plant integration ────────────────────────────────────
    let current = ctx.plant.nudge(episode.rate * ctx.tick_period_secs);
    let target = ctx.plant.target();
    if episode.short_of(current, target) {
        return None;
    }

    info!("ACTUATING: reached {:.2} (target {:.2})", current, target);
    ctx.notify(Notice::Converged {
        temperature: current,
    });
    Some(StateId::Idle)
}

fn abort_episode(ctx: &mut FsmContext, fault: ActuatorError) -> StateId {
    warn!("ACTUATING: {fault}; stopping fan");
    ctx.actuator_fault = Some(fault);
    ctx.notify(Notice::ActuatorFault(fault));
    StateId::Idle
}

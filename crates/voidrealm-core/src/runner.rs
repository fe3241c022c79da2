//! Host loop runner.
//!
//! This module provides [`run_host`], the top-level async function that
//! drives a [`TickingHost`] and an [`InstanceRegistry`] together:
//!
//! - **Request routing**: requests from a [`RequestSource`] are applied
//!   before each registry tick.
//! - **Wall-clock phases**: every registry tick is stamped with
//!   [`Instant::now`], so phase progress follows real time regardless of the
//!   tick interval.
//! - **Game ticks**: the host's game tick advances once per loop, which is
//!   what expires status effects and the cooldown marker.
//! - **Bounded runs**: stop after `max_ticks`, or once idle.

use std::time::Instant;

use tracing::{debug, info, warn};
use voidrealm_types::Notice;
use voidrealm_world::TickingHost;

use crate::config::RunnerConfig;
use crate::error::CooldownStatus;
use crate::notify::Notifier;
use crate::registry::InstanceRegistry;
use crate::requests::{Request, RequestSource};

/// Errors that can occur when starting the host loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The loop has no tick limit and never stops when idle.
    #[error("runner would never stop: max_ticks is 0 and stop_when_idle is false")]
    Unbounded,
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// `max_ticks` ticks were executed.
    MaxTicksReached,
    /// No requests were pending and no instance was live.
    Idle,
}

/// Counters collected over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Number of loop iterations executed.
    pub total_ticks: u64,
    /// Cast requests that created an instance.
    pub casts_accepted: u64,
    /// Cast requests that were refused.
    pub casts_denied: u64,
    /// Break requests that started teardown.
    pub breaks_accepted: u64,
    /// Break requests that were refused.
    pub breaks_denied: u64,
    /// Cooldown checks answered with ready.
    pub cooldown_ready: u64,
    /// Instances removed after finishing.
    pub instances_reaped: u64,
    /// Instances still live when the run ended.
    pub live_at_end: usize,
}

impl RunSummary {
    const fn new() -> Self {
        Self {
            end_reason: RunEndReason::Idle,
            total_ticks: 0,
            casts_accepted: 0,
            casts_denied: 0,
            breaks_accepted: 0,
            breaks_denied: 0,
            cooldown_ready: 0,
            instances_reaped: 0,
            live_at_end: 0,
        }
    }
}

/// Run the host loop until a termination condition is met.
///
/// Each iteration polls `requests`, routes them to `registry`, ticks the
/// registry at the current instant, advances the host's game tick, then
/// sleeps for `settings.tick_interval_ms`.
///
/// # Errors
///
/// Returns [`RunnerError::Unbounded`] if `settings` has neither a tick limit
/// nor idle stopping.
pub async fn run_host<H: TickingHost>(
    registry: &mut InstanceRegistry,
    host: &mut H,
    requests: &mut dyn RequestSource,
    notifier: &mut dyn Notifier,
    settings: &RunnerConfig,
) -> Result<RunSummary, RunnerError> {
    if settings.max_ticks == 0 && !settings.stop_when_idle {
        return Err(RunnerError::Unbounded);
    }

    let mut summary = RunSummary::new();
    info!(
        max_ticks = settings.max_ticks,
        tick_interval_ms = settings.tick_interval_ms,
        stop_when_idle = settings.stop_when_idle,
        "Host loop starting"
    );

    loop {
        let tick = summary.total_ticks.saturating_add(1);
        let now = Instant::now();

        // --- Route requests ---
        for request in requests.poll(tick) {
            route(request, registry, host, notifier, now, &mut summary);
        }

        // --- Tick instances ---
        let report = registry.tick(now, host, notifier);
        let reaped = u64::try_from(report.reaped.len()).unwrap_or(u64::MAX);
        summary.instances_reaped = summary.instances_reaped.saturating_add(reaped);
        host.advance_game_tick();
        summary.total_ticks = tick;
        debug!(tick, live = registry.live_count(), game_tick = host.game_tick(), "Tick complete");

        // --- Check termination ---
        if settings.max_ticks > 0 && tick >= settings.max_ticks {
            summary.end_reason = RunEndReason::MaxTicksReached;
            break;
        }
        if settings.stop_when_idle && requests.is_exhausted() && registry.live_count() == 0 {
            summary.end_reason = RunEndReason::Idle;
            break;
        }

        if settings.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(settings.tick_interval_ms)).await;
        }
    }

    summary.live_at_end = registry.live_count();
    Ok(summary)
}

/// Apply one request to the registry and count the outcome.
fn route<H: TickingHost>(
    request: Request,
    registry: &mut InstanceRegistry,
    host: &mut H,
    notifier: &mut dyn Notifier,
    now: Instant,
    summary: &mut RunSummary,
) {
    match request {
        Request::Cast(actor) => match registry.request_cast(actor, now, &*host, notifier) {
            Ok(instance) => {
                summary.casts_accepted = summary.casts_accepted.saturating_add(1);
                debug!(actor = %actor, instance = %instance, "Cast accepted");
            }
            Err(denied) => {
                summary.casts_denied = summary.casts_denied.saturating_add(1);
                info!(actor = %actor, reason = %denied, "Cast denied");
            }
        },
        Request::Break(actor) => match registry.request_break(actor, now, notifier) {
            Ok(()) => {
                summary.breaks_accepted = summary.breaks_accepted.saturating_add(1);
            }
            Err(denied) => {
                summary.breaks_denied = summary.breaks_denied.saturating_add(1);
                info!(actor = %actor, reason = %denied, "Break denied");
            }
        },
        Request::CheckCooldown(actor) => match registry.check_cooldown(actor, &*host) {
            CooldownStatus::Ready => {
                summary.cooldown_ready = summary.cooldown_ready.saturating_add(1);
                notifier.notify(actor, Notice::CooldownOk);
            }
            CooldownStatus::Denied(denied) => {
                info!(actor = %actor, reason = %denied, "Cooldown check denied");
            }
        },
    }
}

/// Log the end of a run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        casts_accepted = summary.casts_accepted,
        casts_denied = summary.casts_denied,
        breaks_accepted = summary.breaks_accepted,
        breaks_denied = summary.breaks_denied,
        instances_reaped = summary.instances_reaped,
        "Host loop ended"
    );
    if summary.live_at_end > 0 {
        warn!(live = summary.live_at_end, "Run ended with regions still live");
    }
}

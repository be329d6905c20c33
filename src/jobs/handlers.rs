//! Job handlers for the evaluation sweeps

use apalis::prelude::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::jobs::context::JobContext;
use crate::jobs::types::{ScheduleSweepJob, StopLossSweepJob};

/// Handler for the recurring + calendar schedule sweep.
///
/// Runs both evaluators back to back under one re-entrancy guard; an
/// overlapping tick is skipped and recovered by the next one.
pub async fn handle_schedule_sweep(
    _job: ScheduleSweepJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !ctx.try_begin_schedule_sweep() {
        warn!("ScheduleSweepJob: previous sweep still running, skipping tick");
        if let Some(ref metrics) = ctx.metrics {
            metrics.sweeps_skipped_total.inc();
        }
        return Ok(());
    }

    let start = Instant::now();
    let now = Utc::now();

    let recurring = ctx.recurring.run(now).await;
    let calendar = ctx.calendar.run(now).await;

    if let Some(ref metrics) = ctx.metrics {
        metrics
            .schedule_transitions_total
            .inc_by(recurring.fired as u64);
        metrics
            .calendar_executions_total
            .inc_by(calendar.fired as u64);
        metrics
            .adgraph_errors_total
            .inc_by((recurring.failed + calendar.failed) as u64);
        metrics
            .sweep_duration_seconds
            .observe(start.elapsed().as_secs_f64());
    }

    info!(
        recurring_evaluated = recurring.evaluated,
        recurring_fired = recurring.fired,
        recurring_failed = recurring.failed,
        calendar_evaluated = calendar.evaluated,
        calendar_fired = calendar.fired,
        calendar_failed = calendar.failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ScheduleSweepJob: sweep complete"
    );

    ctx.end_schedule_sweep();
    Ok(())
}

/// Handler for the stop-loss batch sweep
pub async fn handle_stop_loss_sweep(
    _job: StopLossSweepJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !ctx.try_begin_stoploss_sweep() {
        warn!("StopLossSweepJob: previous sweep still running, skipping tick");
        if let Some(ref metrics) = ctx.metrics {
            metrics.sweeps_skipped_total.inc();
        }
        return Ok(());
    }

    let start = Instant::now();
    let now = Utc::now();

    let stats = ctx.stoploss.run(now).await;

    if let Some(ref metrics) = ctx.metrics {
        metrics.stoploss_triggers_total.inc_by(stats.triggered as u64);
        metrics.retry_enqueued_total.inc_by(stats.retried as u64);
        metrics
            .sweep_duration_seconds
            .observe(start.elapsed().as_secs_f64());
    }

    info!(
        groups = stats.groups,
        evaluated = stats.evaluated,
        triggered = stats.triggered,
        retried = stats.retried,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "StopLossSweepJob: sweep complete"
    );

    ctx.end_stoploss_sweep();
    Ok(())
}

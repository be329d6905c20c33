use apalis::prelude::Data;
use std::sync::Arc;
use std::time::Duration;

use adpulse::config::WorkerSettings;
use adpulse::db::cache::RecurringScheduleCache;
use adpulse::engine::{CalendarSweep, RecurringSweep, StopLossSweep};
use adpulse::jobs::context::JobContext;
use adpulse::jobs::handlers;
use adpulse::jobs::types::{ScheduleSweepJob, StopLossSweepJob};
use adpulse::metrics::Metrics;

use crate::test_utils::{
    CountingNotifier, MemoryHistory, MemoryRetryQueue, MemoryScheduleStore, MemoryStopLossStore,
    MockAdGraph, OpenBudget, StaticCredentials,
};

fn context() -> Arc<JobContext> {
    let store = Arc::new(MemoryScheduleStore::new());
    let cache = Arc::new(RecurringScheduleCache::new(
        store.clone(),
        Duration::from_secs(0),
    ));
    let adgraph = Arc::new(MockAdGraph::new());
    let notifier = Arc::new(CountingNotifier::new());
    let recurring = RecurringSweep::new(
        cache,
        adgraph.clone(),
        Arc::new(StaticCredentials),
        notifier.clone(),
    );
    let calendar = CalendarSweep::new(
        store,
        Arc::new(MemoryHistory::new()),
        adgraph.clone(),
        Arc::new(StaticCredentials),
        notifier.clone(),
    );
    let stoploss = StopLossSweep::new(
        Arc::new(MemoryStopLossStore::default()),
        Arc::new(MemoryRetryQueue::new()),
        adgraph,
        Arc::new(StaticCredentials),
        notifier,
        Arc::new(OpenBudget::new()),
        WorkerSettings::default(),
    );
    let metrics = Arc::new(Metrics::new().unwrap());
    Arc::new(JobContext::new(recurring, calendar, stoploss, Some(metrics)))
}

#[test]
fn guard_admits_one_claim_at_a_time() {
    let ctx = context();

    assert!(ctx.try_begin_schedule_sweep());
    assert!(!ctx.try_begin_schedule_sweep());
    ctx.end_schedule_sweep();
    assert!(ctx.try_begin_schedule_sweep());
    ctx.end_schedule_sweep();

    assert!(ctx.try_begin_stoploss_sweep());
    assert!(!ctx.try_begin_stoploss_sweep());
    ctx.end_stoploss_sweep();
    assert!(ctx.try_begin_stoploss_sweep());
    ctx.end_stoploss_sweep();
}

#[test]
fn guards_are_independent_per_sweep_kind() {
    let ctx = context();

    assert!(ctx.try_begin_schedule_sweep());
    // A claimed schedule sweep never blocks the stop-loss sweep
    assert!(ctx.try_begin_stoploss_sweep());
    ctx.end_schedule_sweep();
    ctx.end_stoploss_sweep();
}

#[tokio::test]
async fn overlapping_schedule_tick_is_skipped_and_counted() {
    let ctx = context();
    let metrics = ctx.metrics.clone().unwrap();

    // A pass is already in flight
    assert!(ctx.try_begin_schedule_sweep());

    handlers::handle_schedule_sweep(ScheduleSweepJob::default(), Data::new(ctx.clone()))
        .await
        .unwrap();

    assert_eq!(metrics.sweeps_skipped_total.get(), 1);
    // The skipped handler must not release a guard it never claimed
    assert!(!ctx.try_begin_schedule_sweep());

    // Once released, the next tick runs and exits cleanly
    ctx.end_schedule_sweep();
    handlers::handle_schedule_sweep(ScheduleSweepJob::default(), Data::new(ctx.clone()))
        .await
        .unwrap();
    assert_eq!(metrics.sweeps_skipped_total.get(), 1);
    assert!(ctx.try_begin_schedule_sweep());
    ctx.end_schedule_sweep();
}

#[tokio::test]
async fn overlapping_stoploss_tick_is_skipped_and_counted() {
    let ctx = context();
    let metrics = ctx.metrics.clone().unwrap();

    assert!(ctx.try_begin_stoploss_sweep());

    handlers::handle_stop_loss_sweep(StopLossSweepJob::default(), Data::new(ctx.clone()))
        .await
        .unwrap();

    assert_eq!(metrics.sweeps_skipped_total.get(), 1);
    assert!(!ctx.try_begin_stoploss_sweep());

    ctx.end_stoploss_sweep();
    handlers::handle_stop_loss_sweep(StopLossSweepJob::default(), Data::new(ctx.clone()))
        .await
        .unwrap();
    assert_eq!(metrics.sweeps_skipped_total.get(), 1);
    assert!(ctx.try_begin_stoploss_sweep());
    ctx.end_stoploss_sweep();
}

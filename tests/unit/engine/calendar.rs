use chrono::Duration;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use adpulse::db::{ExecutionHistoryStore, ScheduleStore};
use adpulse::engine::CalendarSweep;
use adpulse::models::execution::{EntityStatus, ExecutionStatus};
use adpulse::models::schedule::SlotAction;

use crate::test_utils::{
    calendar, slot, CountingNotifier, Failure, MemoryHistory, MemoryScheduleStore, MockAdGraph,
    StaticCredentials,
};

struct Fixture {
    sweep: CalendarSweep,
    store: Arc<MemoryScheduleStore>,
    history: Arc<MemoryHistory>,
    adgraph: Arc<MockAdGraph>,
    notifier: Arc<CountingNotifier>,
}

async fn fixture(schedule: adpulse::models::schedule::CalendarSchedule) -> Fixture {
    let store = Arc::new(MemoryScheduleStore::with_calendar(schedule).await);
    let history = Arc::new(MemoryHistory::new());
    let adgraph = Arc::new(MockAdGraph::new());
    let notifier = Arc::new(CountingNotifier::new());
    let sweep = CalendarSweep::new(
        store.clone(),
        history.clone(),
        adgraph.clone(),
        Arc::new(StaticCredentials),
        notifier.clone(),
    );
    Fixture {
        sweep,
        store,
        history,
        adgraph,
        notifier,
    }
}

#[tokio::test]
async fn fires_activation_at_slot_start() {
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)])).await;
    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;

    let stats = f.sweep.run(now).await;

    assert_eq!(stats.fired, 1);
    assert_eq!(
        f.adgraph.statuses.lock().await.get("e1"),
        Some(&EntityStatus::Active)
    );
    assert_eq!(f.history.count(ExecutionStatus::Success).await, 1);
    assert_eq!(f.notifier.slot_events.load(Ordering::SeqCst), 1);

    // Marker persisted for duplicate suppression
    let stored = f.store.get_calendar("o1", "e1").await.unwrap().unwrap();
    assert_eq!(stored.last_date.as_deref(), Some("2026-03-10"));
    assert_eq!(stored.last_slot_id.as_deref(), Some("s1"));
    assert_eq!(stored.last_action, Some(SlotAction::Activate));
}

#[tokio::test]
async fn overlapping_ticks_fire_exactly_once() {
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)])).await;
    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;

    let first = f.sweep.run(now).await;
    assert_eq!(first.fired, 1);

    // A second tick one minute later still matches the slot window but must
    // recognize the execution and stand down
    let later = now + Duration::minutes(1);
    f.history.set_anchor(later).await;
    let second = f.sweep.run(later).await;

    assert_eq!(second.fired, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(f.adgraph.batch_set_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.history.count(ExecutionStatus::Success).await, 1);
}

#[tokio::test]
async fn manual_status_drift_is_corrected() {
    let mut schedule = calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)]);
    // Marker says the slot already ran today
    schedule.last_date = Some("2026-03-10".to_string());
    schedule.last_slot_id = Some("s1".to_string());
    schedule.last_action = Some(SlotAction::Activate);
    let f = fixture(schedule).await;

    let now = crate::test_utils::utc(2026, 3, 10, 9, 1);
    f.history.set_anchor(now).await;
    // History backs the marker up
    f.history
        .append(&adpulse::models::execution::ExecutionRecord::success(
            "o1", "e1", "2026-03-10", "s1", SlotAction::Activate, now,
        ))
        .await
        .unwrap();
    // ...but someone paused the entity by hand in the meantime
    f.adgraph.set_entity_status("e1", EntityStatus::Paused).await;

    let stats = f.sweep.run(now).await;

    assert_eq!(stats.fired, 1);
    assert_eq!(
        f.adgraph.statuses.lock().await.get("e1"),
        Some(&EntityStatus::Active)
    );
}

#[tokio::test]
async fn marker_without_history_refires() {
    // Marker persisted and status already correct, but no history record:
    // the three idempotence signals disagree, so the slot re-asserts
    let mut schedule = calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)]);
    schedule.last_date = Some("2026-03-10".to_string());
    schedule.last_slot_id = Some("s1".to_string());
    schedule.last_action = Some(SlotAction::Activate);
    let f = fixture(schedule).await;
    f.adgraph.set_entity_status("e1", EntityStatus::Active).await;

    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;
    let stats = f.sweep.run(now).await;

    assert_eq!(stats.fired, 1);
    assert_eq!(f.adgraph.batch_set_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stop_wins_when_both_windows_match() {
    // A one-minute slot: both the start and stop windows cover minute 540
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 541)])).await;
    f.adgraph.set_entity_status("e1", EntityStatus::Active).await;

    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;
    let stats = f.sweep.run(now).await;

    assert_eq!(stats.fired, 1);
    assert_eq!(
        f.adgraph.statuses.lock().await.get("e1"),
        Some(&EntityStatus::Paused)
    );
    let stored = f.store.get_calendar("o1", "e1").await.unwrap().unwrap();
    assert_eq!(stored.last_action, Some(SlotAction::Stop));
}

#[tokio::test]
async fn permission_denied_skips_the_slot_for_good() {
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)])).await;
    f.adgraph.fail_writes("e1", Failure::Permission).await;

    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;
    let first = f.sweep.run(now).await;

    assert_eq!(first.fired, 0);
    assert_eq!(first.failed, 1);
    assert_eq!(f.history.count(ExecutionStatus::Error).await, 1);

    // The next tick must not retry a slot the credential cannot touch
    let later = now + Duration::minutes(1);
    f.history.set_anchor(later).await;
    let second = f.sweep.run(later).await;

    assert_eq!(second.skipped, 1);
    assert_eq!(f.adgraph.batch_set_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.history.count(ExecutionStatus::Error).await, 1);
}

#[tokio::test]
async fn rate_limited_slot_retries_without_recording() {
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)])).await;
    f.adgraph.fail_writes("e1", Failure::RateLimit).await;

    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;
    let first = f.sweep.run(now).await;

    assert_eq!(first.failed, 1);
    assert!(f.history.records.lock().await.is_empty());

    // Limit clears; the next tick inside the window succeeds
    f.adgraph.set_failures.lock().await.clear();
    let later = now + Duration::minutes(1);
    f.history.set_anchor(later).await;
    let second = f.sweep.run(later).await;

    assert_eq!(second.fired, 1);
    assert_eq!(f.history.count(ExecutionStatus::Success).await, 1);
}

#[tokio::test]
async fn disabled_slots_and_other_days_are_ignored() {
    let mut off = slot("s1", 540, 700);
    off.enabled = false;
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![off])).await;

    let now = crate::test_utils::utc(2026, 3, 10, 9, 0);
    f.history.set_anchor(now).await;
    assert_eq!(f.sweep.run(now).await.fired, 0);

    let g = fixture(calendar("o1", "e1", "2026-03-11", vec![slot("s1", 540, 700)])).await;
    g.history.set_anchor(now).await;
    assert_eq!(g.sweep.run(now).await.fired, 0);
    assert_eq!(g.adgraph.batch_set_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn outside_the_window_nothing_fires() {
    let f = fixture(calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)])).await;

    // Minute 543: three minutes past the start, beyond the ±2 tolerance
    let now = crate::test_utils::utc(2026, 3, 10, 9, 3);
    f.history.set_anchor(now).await;
    let stats = f.sweep.run(now).await;

    assert_eq!(stats.fired, 0);
    assert_eq!(f.adgraph.write_count().await, 0);
}

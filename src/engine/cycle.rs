//! Recurring cycle state machine and sweep
//!
//! Cycle order for a 4-point schedule: STOP_1 → ACTIVE_1 → STOP_2 → ACTIVE_2,
//! restarting at STOP_1 the next local day; the 2-point variant is the same
//! machine restricted to the first two points. The next expected point is
//! derived from the last executed action rather than wall clock alone, so a
//! transition whose window passed while the process was down still fires on
//! the next tick instead of being silently skipped.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::cache::RecurringScheduleCache;
use crate::models::schedule::{CyclePoint, RecurringSchedule};
use crate::services::adgraph::AdGraphClient;
use crate::services::credentials::CredentialProvider;
use crate::services::notify::NotificationSink;
use crate::time::{is_within_window, local_date, minute_of_day};

/// Tolerance of the recurring evaluator's windows, in minutes
pub const RECURRING_TOLERANCE_MINUTES: u32 = 5;

/// Minutes after midnight during which a minute-0 target still fires on a
/// fresh day; minute 0 is unreachable by the has-passed comparison
const MIDNIGHT_GRACE_MINUTES: u32 = 5;

/// Catch-up branch: the target's window was missed (process downtime,
/// dropped tick) but the transition is still owed for today
fn has_passed(current_minute: u32, target_minute: u32) -> bool {
    current_minute > target_minute
}

/// Explicit midnight case for targets at minute 0 early in a fresh day
fn is_midnight_start(current_minute: u32, target_minute: u32) -> bool {
    target_minute == 0 && current_minute < MIDNIGHT_GRACE_MINUTES
}

fn fires_now(current_minute: u32, target_minute: u32) -> bool {
    is_within_window(current_minute, target_minute, RECURRING_TOLERANCE_MINUTES)
        || has_passed(current_minute, target_minute)
        || is_midnight_start(current_minute, target_minute)
}

/// A transition the sweep must apply right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTransition {
    pub point: CyclePoint,
    /// Local date the transition belongs to, persisted as the marker date
    pub local_date: String,
}

/// Decide which cycle point, if any, must fire for `schedule` at `now`.
///
/// Pure: all I/O stays in the sweep. No-op is the overwhelmingly common
/// result per tick.
pub fn next_transition(schedule: &RecurringSchedule, now: DateTime<Utc>) -> Option<FiredTransition> {
    let current_minute = minute_of_day(&schedule.timezone, now);
    let today = local_date(&schedule.timezone, now);

    let same_day = schedule.last_date.as_deref() == Some(today.as_str());

    if same_day {
        if let Some(last) = schedule.last_action {
            // Continuation: the next expected point comes from the cycle
            // order, never from scanning targets
            let expected = last.next(schedule.is_four_point())?;
            let target = schedule.target_minute(expected)?;
            if fires_now(current_minute, target) {
                return Some(FiredTransition {
                    point: expected,
                    local_date: today,
                });
            }
            return None;
        }
    }

    // Fresh cycle for today: either no marker yet, or the last execution was
    // on an earlier date (including a completed cycle whose final point was
    // yesterday's ACTIVE_2). Scanning in cycle order and firing the first
    // owed point keeps the sequence ordered even when earlier windows were
    // missed; subsequent ticks catch the cycle up point by point.
    for point in schedule.points() {
        let target = schedule.target_minute(point)?;
        if fires_now(current_minute, target) {
            return Some(FiredTransition {
                point,
                local_date: today,
            });
        }
    }

    None
}

/// Outcome counters for one sweep pass
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub evaluated: usize,
    pub fired: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Applies due recurring transitions to the ad graph
pub struct RecurringSweep {
    cache: Arc<RecurringScheduleCache>,
    adgraph: Arc<dyn AdGraphClient>,
    credentials: Arc<dyn CredentialProvider>,
    notifier: Arc<dyn NotificationSink>,
}

impl RecurringSweep {
    pub fn new(
        cache: Arc<RecurringScheduleCache>,
        adgraph: Arc<dyn AdGraphClient>,
        credentials: Arc<dyn CredentialProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            cache,
            adgraph,
            credentials,
            notifier,
        }
    }

    /// Evaluate every recurring schedule once. A fault in one schedule never
    /// aborts the pass.
    pub async fn run(&self, now: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();

        let schedules = match self.cache.list().await {
            Ok(schedules) => schedules,
            Err(e) => {
                warn!(error = %e, "RecurringSweep: failed to list schedules, skipping pass");
                return stats;
            }
        };

        for schedule in &schedules {
            stats.evaluated += 1;

            if let Err(e) = schedule.validate() {
                warn!(
                    owner = %schedule.owner,
                    entity_id = %schedule.entity_id,
                    error = %e,
                    "RecurringSweep: malformed schedule skipped"
                );
                stats.skipped += 1;
                continue;
            }

            let Some(transition) = next_transition(schedule, now) else {
                continue;
            };

            match self.fire(schedule, &transition, now).await {
                Ok(()) => stats.fired += 1,
                Err(e) => {
                    warn!(
                        owner = %schedule.owner,
                        entity_id = %schedule.entity_id,
                        point = %transition.point.as_str(),
                        error = %e,
                        "RecurringSweep: transition failed, will retry next tick"
                    );
                    stats.failed += 1;
                }
            }
        }

        debug!(
            evaluated = stats.evaluated,
            fired = stats.fired,
            failed = stats.failed,
            "RecurringSweep: pass complete"
        );
        stats
    }

    async fn fire(
        &self,
        schedule: &RecurringSchedule,
        transition: &FiredTransition,
        now: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let credential = self.credentials.credential_for(&schedule.owner).await?;
        let desired = transition.point.desired_status();

        self.adgraph
            .set_status(&credential, &schedule.entity_id, desired)
            .await?;

        // Persist only after the external call succeeded; a failed call
        // leaves the marker untouched so the next tick retries
        self.cache
            .mark_executed(
                &schedule.owner,
                &schedule.entity_id,
                transition.point,
                &transition.local_date,
                now,
            )
            .await?;

        info!(
            owner = %schedule.owner,
            entity_id = %schedule.entity_id,
            point = %transition.point.as_str(),
            status = %desired.as_str(),
            date = %transition.local_date,
            "RecurringSweep: transition executed"
        );

        if let Err(e) = self
            .notifier
            .schedule_executed(
                &schedule.owner,
                &schedule.entity_id,
                transition.point.as_str(),
            )
            .await
        {
            // Notification failures never block a committed status change
            warn!(error = %e, "RecurringSweep: notification failed");
        }

        Ok(())
    }
}

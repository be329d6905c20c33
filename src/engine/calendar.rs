//! Calendar slot evaluator
//!
//! Idempotence rests on three signals together: the entity's actual external
//! status (detects manual drift), the append-only execution history (detects
//! "already fired and still correct"), and the persisted last-executed marker
//! (detects crash-after-fire-before-persist). A slot is skipped only when all
//! three agree; any disagreement re-fires, which makes the evaluator safe to
//! call redundantly from overlapping ticks and across processes.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::db::store::{ExecutionHistoryStore, ScheduleStore};
use crate::engine::cycle::SweepStats;
use crate::models::execution::ExecutionRecord;
use crate::models::schedule::{CalendarSchedule, SlotAction, TimeSlot};
use crate::services::adgraph::{AdGraphClient, AdGraphError};
use crate::services::credentials::CredentialProvider;
use crate::services::notify::NotificationSink;
use crate::time::{is_within_window, local_date, minute_of_day};

/// Tolerance of the calendar evaluator's windows, in minutes. Tuned to a
/// sub-minute polling tick without firing twice per slot.
pub const CALENDAR_TOLERANCE_MINUTES: u32 = 2;

/// History lookback for duplicate suppression, in minutes
const HISTORY_LOOKBACK_MINUTES: i64 = 2;

type DeniedSlotKey = (String, String, String, String, SlotAction);

/// Evaluates calendar schedules against the current instant
pub struct CalendarSweep {
    store: Arc<dyn ScheduleStore>,
    history: Arc<dyn ExecutionHistoryStore>,
    adgraph: Arc<dyn AdGraphClient>,
    credentials: Arc<dyn CredentialProvider>,
    notifier: Arc<dyn NotificationSink>,
    /// Slots that hit permission-denied; futile to retry for the life of
    /// this process
    denied_slots: Mutex<HashSet<DeniedSlotKey>>,
}

impl CalendarSweep {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        history: Arc<dyn ExecutionHistoryStore>,
        adgraph: Arc<dyn AdGraphClient>,
        credentials: Arc<dyn CredentialProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            history,
            adgraph,
            credentials,
            notifier,
            denied_slots: Mutex::new(HashSet::new()),
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();

        // Coarse pre-filter date: a day behind UTC covers every timezone
        // still on the previous local date
        let filter_date = format!("{}", (now - Duration::days(1)).format("%Y-%m-%d"));

        let schedules = match self.store.list_calendar_from(&filter_date).await {
            Ok(schedules) => schedules,
            Err(e) => {
                warn!(error = %e, "CalendarSweep: failed to list schedules, skipping pass");
                return stats;
            }
        };

        for listed in &schedules {
            stats.evaluated += 1;
            if let Err(e) = self.evaluate_schedule(listed, now, &mut stats).await {
                warn!(
                    owner = %listed.owner,
                    entity_id = %listed.entity_id,
                    error = %e,
                    "CalendarSweep: schedule evaluation failed"
                );
                stats.failed += 1;
            }
        }

        debug!(
            evaluated = stats.evaluated,
            fired = stats.fired,
            failed = stats.failed,
            skipped = stats.skipped,
            "CalendarSweep: pass complete"
        );
        stats
    }

    async fn evaluate_schedule(
        &self,
        listed: &CalendarSchedule,
        now: DateTime<Utc>,
        stats: &mut SweepStats,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Always act on the freshest durable copy, never the listing or a
        // cache: another process may have edited or executed this schedule
        let Some(schedule) = self.store.get_calendar(&listed.owner, &listed.entity_id).await?
        else {
            return Ok(());
        };

        if let Err(e) = schedule.validate() {
            warn!(
                owner = %schedule.owner,
                entity_id = %schedule.entity_id,
                error = %e,
                "CalendarSweep: malformed schedule skipped"
            );
            stats.skipped += 1;
            return Ok(());
        }

        let today = local_date(&schedule.timezone, now);
        let current_minute = minute_of_day(&schedule.timezone, now);

        let Some(slots) = schedule.days.get(&today) else {
            return Ok(());
        };

        let due: Vec<(&TimeSlot, SlotAction)> = slots
            .iter()
            .filter(|slot| slot.enabled)
            .filter_map(|slot| {
                let stop_due =
                    is_within_window(current_minute, slot.stop_minute, CALENDAR_TOLERANCE_MINUTES);
                let start_due =
                    is_within_window(current_minute, slot.start_minute, CALENDAR_TOLERANCE_MINUTES);
                // When start and stop sit close enough for both windows to
                // match, the stop side wins
                if stop_due {
                    Some((slot, SlotAction::Stop))
                } else if start_due {
                    Some((slot, SlotAction::Activate))
                } else {
                    None
                }
            })
            .collect();

        if due.is_empty() {
            return Ok(());
        }

        let credential = self.credentials.credential_for(&schedule.owner).await?;

        for (slot, action) in due {
            self.evaluate_slot(&credential, &schedule, &today, slot, action, now, stats)
                .await;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn evaluate_slot(
        &self,
        credential: &str,
        schedule: &CalendarSchedule,
        today: &str,
        slot: &TimeSlot,
        action: SlotAction,
        now: DateTime<Utc>,
        stats: &mut SweepStats,
    ) {
        let denied_key = (
            schedule.owner.clone(),
            schedule.entity_id.clone(),
            today.to_string(),
            slot.id.clone(),
            action,
        );
        if self.denied_slots.lock().await.contains(&denied_key) {
            debug!(
                entity_id = %schedule.entity_id,
                slot_id = %slot.id,
                "CalendarSweep: slot previously permission-denied, skipping"
            );
            stats.skipped += 1;
            return;
        }

        let desired = action.desired_status();

        // Read before write: the entity may have been changed manually
        // outside this system
        let actual = match self.adgraph.get_status(credential, &schedule.entity_id).await {
            Ok(status) => status,
            Err(e) => {
                if !e.is_transient() {
                    warn!(
                        entity_id = %schedule.entity_id,
                        error = %e,
                        "CalendarSweep: status read failed"
                    );
                }
                stats.failed += 1;
                return;
            }
        };

        let has_recent = self
            .history
            .has_recent_success(
                &schedule.owner,
                &schedule.entity_id,
                today,
                &slot.id,
                action,
                HISTORY_LOOKBACK_MINUTES,
            )
            .await
            .unwrap_or(false);

        let marker_agrees = schedule.last_date.as_deref() == Some(today)
            && schedule.last_slot_id.as_deref() == Some(slot.id.as_str())
            && schedule.last_action == Some(action);

        if actual == desired && has_recent && marker_agrees {
            // Idempotent no-op: already fired, still correct, marker persisted
            stats.skipped += 1;
            return;
        }

        // Either the first time reaching this slot, or drift: the entity was
        // changed back since the last fire. Both re-assert the desired state.
        let batch_result = self
            .adgraph
            .set_status_batch(credential, &[schedule.entity_id.clone()], desired)
            .await;

        let outcome = match batch_result {
            Ok(mut per_entity) => per_entity
                .remove(&schedule.entity_id)
                .unwrap_or_else(|| Err(AdGraphError::Transport("missing batch result".into()))),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                if let Err(e) = self
                    .store
                    .mark_calendar_executed(
                        &schedule.owner,
                        &schedule.entity_id,
                        today,
                        &slot.id,
                        action,
                    )
                    .await
                {
                    warn!(
                        entity_id = %schedule.entity_id,
                        error = %e,
                        "CalendarSweep: marker update failed after successful call"
                    );
                }
                if let Err(e) = self
                    .history
                    .append(&ExecutionRecord::success(
                        &schedule.owner,
                        &schedule.entity_id,
                        today,
                        &slot.id,
                        action,
                        now,
                    ))
                    .await
                {
                    warn!(
                        entity_id = %schedule.entity_id,
                        error = %e,
                        "CalendarSweep: history append failed"
                    );
                }
                info!(
                    owner = %schedule.owner,
                    entity_id = %schedule.entity_id,
                    slot_id = %slot.id,
                    action = %action.as_str(),
                    date = %today,
                    "CalendarSweep: slot executed"
                );
                if let Err(e) = self
                    .notifier
                    .slot_executed(&schedule.owner, &schedule.entity_id, action)
                    .await
                {
                    warn!(error = %e, "CalendarSweep: notification failed");
                }
                stats.fired += 1;
            }
            Err(AdGraphError::RateLimited(msg)) => {
                // Silent retry next tick, no record written
                debug!(
                    entity_id = %schedule.entity_id,
                    slot_id = %slot.id,
                    error = %msg,
                    "CalendarSweep: rate limited, retrying next tick"
                );
                stats.failed += 1;
            }
            Err(AdGraphError::PermissionDenied(msg)) => {
                warn!(
                    entity_id = %schedule.entity_id,
                    slot_id = %slot.id,
                    error = %msg,
                    "CalendarSweep: permission denied, slot permanently skipped"
                );
                let record = ExecutionRecord::error(
                    &schedule.owner,
                    &schedule.entity_id,
                    today,
                    &slot.id,
                    action,
                    now,
                    format!("permission denied: {}", msg),
                );
                if let Err(e) = self.history.append(&record).await {
                    warn!(error = %e, "CalendarSweep: history append failed");
                }
                self.denied_slots.lock().await.insert(denied_key);
                stats.failed += 1;
            }
            Err(e) => {
                warn!(
                    entity_id = %schedule.entity_id,
                    slot_id = %slot.id,
                    error = %e,
                    "CalendarSweep: slot execution failed, marker untouched"
                );
                let record = ExecutionRecord::error(
                    &schedule.owner,
                    &schedule.entity_id,
                    today,
                    &slot.id,
                    action,
                    now,
                    e.to_string(),
                );
                if let Err(e) = self.history.append(&record).await {
                    warn!(error = %e, "CalendarSweep: history append failed");
                }
                stats.failed += 1;
            }
        }
    }
}

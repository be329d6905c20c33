//! Store contracts the engine evaluates against
//!
//! All durable mutations are single-row upserts/updates scoped by
//! (owner, entity); idempotency comes from the marker+history pattern in the
//! calendar evaluator, not from locking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::execution::ExecutionRecord;
use crate::models::schedule::{CalendarSchedule, CyclePoint, RecurringSchedule, SlotAction};
use crate::models::stoploss::StopLossConfig;

/// CRUD over recurring and calendar schedules, keyed by (owner, entity)
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn list_recurring(
        &self,
    ) -> Result<Vec<RecurringSchedule>, Box<dyn std::error::Error + Send + Sync>>;

    /// Replaces any existing recurring schedule for the same entity
    async fn upsert_recurring(
        &self,
        schedule: &RecurringSchedule,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_recurring(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Persist the last-executed marker after a successful transition
    async fn mark_recurring_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: CyclePoint,
        date: &str,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Calendar schedules with at least one date on or after `date`. This is
    /// the coarse pre-filter that bounds per-tick evaluation cost.
    async fn list_calendar_from(
        &self,
        date: &str,
    ) -> Result<Vec<CalendarSchedule>, Box<dyn std::error::Error + Send + Sync>>;

    /// Freshest durable copy, bypassing any cache layer
    async fn get_calendar(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<Option<CalendarSchedule>, Box<dyn std::error::Error + Send + Sync>>;

    /// Merge `schedule.days` into any existing record (per-date shallow
    /// merge); when the result has an enabled slot, the entity's recurring
    /// schedule is removed because calendar schedules take priority
    async fn upsert_calendar(
        &self,
        schedule: &CalendarSchedule,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_calendar(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn mark_calendar_executed(
        &self,
        owner: &str,
        entity_id: &str,
        date: &str,
        slot_id: &str,
        action: SlotAction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Append-only execution history with a recency probe
#[async_trait]
pub trait ExecutionHistoryStore: Send + Sync {
    async fn append(
        &self,
        record: &ExecutionRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Whether a Success record for the same (date, slot, action) exists
    /// within the last `within_minutes`
    async fn has_recent_success(
        &self,
        owner: &str,
        entity_id: &str,
        date: &str,
        slot_id: &str,
        action: SlotAction,
        within_minutes: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Stop-loss configuration access for the batch orchestrator
#[async_trait]
pub trait StopLossStore: Send + Sync {
    async fn list_enabled(
        &self,
    ) -> Result<Vec<StopLossConfig>, Box<dyn std::error::Error + Send + Sync>>;

    /// Self-termination: flips `enabled` off after a successful pause
    async fn disable(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Account-level flag gating batch processing for (owner, account)
    async fn is_batch_enabled(
        &self,
        owner: &str,
        account_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Retry queue consulted by an out-of-scope retry sweep
#[async_trait]
pub trait RetryQueue: Send + Sync {
    /// Upsert by (owner, entity): bumps the retry count and pushes
    /// `next_retry_at` out exponentially
    async fn upsert_failure(
        &self,
        owner: &str,
        entity_id: &str,
        error: &str,
        max_retries: i32,
        base_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

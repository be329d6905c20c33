//! Read-through cache for recurring schedules
//!
//! The recurring sweep polls frequently and the schedule set changes rarely,
//! so listings are served from a TTL'd snapshot behind the store trait. Every
//! write path invalidates. The calendar evaluator deliberately does NOT go
//! through this layer: it re-reads durable storage per schedule to pick up
//! cross-process edits, and that asymmetry is intentional.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::store::ScheduleStore;
use crate::models::schedule::{CyclePoint, RecurringSchedule};

struct Snapshot {
    taken_at: std::time::Instant,
    schedules: Vec<RecurringSchedule>,
}

pub struct RecurringScheduleCache {
    store: Arc<dyn ScheduleStore>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl RecurringScheduleCache {
    pub fn new(store: Arc<dyn ScheduleStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// All recurring schedules, from the snapshot when fresh, otherwise
    /// re-read from the store
    pub async fn list(
        &self,
    ) -> Result<Vec<RecurringSchedule>, Box<dyn std::error::Error + Send + Sync>> {
        {
            let snapshot = self.snapshot.read().await;
            if let Some(ref snap) = *snapshot {
                if snap.taken_at.elapsed() < self.ttl {
                    return Ok(snap.schedules.clone());
                }
            }
        }

        let schedules = self.store.list_recurring().await?;
        debug!(count = schedules.len(), "recurring schedule cache refreshed");
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Some(Snapshot {
            taken_at: std::time::Instant::now(),
            schedules: schedules.clone(),
        });
        Ok(schedules)
    }

    /// Persist an execution marker and invalidate the snapshot
    pub async fn mark_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: CyclePoint,
        date: &str,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.store
            .mark_recurring_executed(owner, entity_id, action, date, at)
            .await?;
        self.invalidate().await;
        Ok(())
    }

    pub async fn invalidate(&self) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = None;
    }
}

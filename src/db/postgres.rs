//! Postgres-backed store implementations

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls, Row};

use crate::config;
use crate::db::store::{ExecutionHistoryStore, RetryQueue, ScheduleStore, StopLossStore};
use crate::models::execution::{ExecutionRecord, ExecutionStatus};
use crate::models::schedule::{CalendarSchedule, CyclePoint, RecurringSchedule, SlotAction, TimeSlot};
use crate::models::stoploss::StopLossConfig;
use crate::services::credentials::CredentialProvider;

pub struct PostgresStore {
    client: Arc<RwLock<Option<Client>>>,
}

impl PostgresStore {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let database_url = config::get_database_url();
        let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
            .await
            .map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("Failed to connect to Postgres: {}", e),
                )) as Box<dyn std::error::Error + Send + Sync>
            })?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self {
            client: Arc::new(RwLock::new(Some(client))),
        };

        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.batch_execute(
                "CREATE TABLE IF NOT EXISTS recurring_schedules (
                    owner TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    timezone TEXT NOT NULL,
                    stop1 INT NOT NULL,
                    active1 INT NOT NULL,
                    stop2 INT,
                    active2 INT,
                    last_action TEXT,
                    last_date TEXT,
                    last_executed_at TIMESTAMPTZ,
                    PRIMARY KEY (owner, entity_id)
                );
                CREATE TABLE IF NOT EXISTS calendar_schedules (
                    owner TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    timezone TEXT NOT NULL,
                    days_json TEXT NOT NULL,
                    last_date TEXT,
                    last_slot_id TEXT,
                    last_action TEXT,
                    PRIMARY KEY (owner, entity_id)
                );
                CREATE TABLE IF NOT EXISTS execution_history (
                    id TEXT PRIMARY KEY,
                    owner TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    schedule_date TEXT NOT NULL,
                    slot_id TEXT NOT NULL,
                    action TEXT NOT NULL,
                    status TEXT NOT NULL,
                    executed_at TIMESTAMPTZ NOT NULL,
                    error TEXT
                );
                CREATE INDEX IF NOT EXISTS execution_history_lookup
                    ON execution_history (owner, entity_id, schedule_date, slot_id, action, executed_at);
                CREATE TABLE IF NOT EXISTS stop_loss_configs (
                    owner TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    account_id TEXT NOT NULL,
                    entity_name TEXT NOT NULL DEFAULT '',
                    enabled BOOL NOT NULL DEFAULT TRUE,
                    cost_per_result_enabled BOOL NOT NULL DEFAULT FALSE,
                    cost_per_result_threshold DOUBLE PRECISION,
                    zero_results_spend_enabled BOOL NOT NULL DEFAULT FALSE,
                    zero_results_spend_threshold DOUBLE PRECISION,
                    PRIMARY KEY (owner, entity_id)
                );
                CREATE TABLE IF NOT EXISTS account_batch_flags (
                    owner TEXT NOT NULL,
                    account_id TEXT NOT NULL,
                    enabled BOOL NOT NULL DEFAULT TRUE,
                    PRIMARY KEY (owner, account_id)
                );
                CREATE TABLE IF NOT EXISTS retry_queue (
                    owner TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    error TEXT NOT NULL,
                    retry_count INT NOT NULL DEFAULT 0,
                    max_retries INT NOT NULL,
                    next_retry_at TIMESTAMPTZ NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    PRIMARY KEY (owner, entity_id)
                );
                CREATE TABLE IF NOT EXISTS owner_credentials (
                    owner TEXT PRIMARY KEY,
                    access_token TEXT NOT NULL
                );",
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to initialize schema: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }

    fn recurring_from_row(row: &Row) -> RecurringSchedule {
        let last_action: Option<String> = row.get(7);
        RecurringSchedule {
            owner: row.get(0),
            entity_id: row.get(1),
            timezone: row.get(2),
            stop1: row.get::<_, i32>(3) as u32,
            active1: row.get::<_, i32>(4) as u32,
            stop2: row.get::<_, Option<i32>>(5).map(|m| m as u32),
            active2: row.get::<_, Option<i32>>(6).map(|m| m as u32),
            last_action: last_action.as_deref().and_then(CyclePoint::parse),
            last_date: row.get(8),
            last_executed_at: row.get(9),
        }
    }

    fn calendar_from_row(
        row: &Row,
    ) -> Result<CalendarSchedule, Box<dyn std::error::Error + Send + Sync>> {
        let days_json: String = row.get(3);
        let days: BTreeMap<String, Vec<TimeSlot>> =
            serde_json::from_str(&days_json).map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Failed to deserialize calendar days: {}", e),
                )) as Box<dyn std::error::Error + Send + Sync>
            })?;
        let last_action: Option<String> = row.get(6);
        Ok(CalendarSchedule {
            owner: row.get(0),
            entity_id: row.get(1),
            timezone: row.get(2),
            days,
            last_date: row.get(4),
            last_slot_id: row.get(5),
            last_action: last_action.as_deref().and_then(SlotAction::parse),
        })
    }

    /// Check if the Postgres connection is available
    pub async fn is_available(&self) -> bool {
        let client = self.client.read().await;
        client.is_some()
    }
}

const RECURRING_COLUMNS: &str =
    "owner, entity_id, timezone, stop1, active1, stop2, active2, last_action, last_date, last_executed_at";
const CALENDAR_COLUMNS: &str =
    "owner, entity_id, timezone, days_json, last_date, last_slot_id, last_action";

#[async_trait]
impl ScheduleStore for PostgresStore {
    async fn list_recurring(
        &self,
    ) -> Result<Vec<RecurringSchedule>, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    &format!("SELECT {} FROM recurring_schedules", RECURRING_COLUMNS),
                    &[],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query recurring schedules: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            Ok(rows.iter().map(Self::recurring_from_row).collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn upsert_recurring(
        &self,
        schedule: &RecurringSchedule,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        schedule.validate().map_err(|e| {
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
                as Box<dyn std::error::Error + Send + Sync>
        })?;

        let client = self.client.read().await;
        if let Some(ref c) = *client {
            // At most one recurring schedule per entity; replacing resets
            // the execution marker
            c.execute(
                "INSERT INTO recurring_schedules
                    (owner, entity_id, timezone, stop1, active1, stop2, active2,
                     last_action, last_date, last_executed_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, NULL, NULL)
                 ON CONFLICT (owner, entity_id) DO UPDATE SET
                    timezone = EXCLUDED.timezone,
                    stop1 = EXCLUDED.stop1,
                    active1 = EXCLUDED.active1,
                    stop2 = EXCLUDED.stop2,
                    active2 = EXCLUDED.active2,
                    last_action = NULL,
                    last_date = NULL,
                    last_executed_at = NULL",
                &[
                    &schedule.owner,
                    &schedule.entity_id,
                    &schedule.timezone,
                    &(schedule.stop1 as i32),
                    &(schedule.active1 as i32),
                    &schedule.stop2.map(|m| m as i32),
                    &schedule.active2.map(|m| m as i32),
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to upsert recurring schedule: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }

    async fn delete_recurring(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "DELETE FROM recurring_schedules WHERE owner = $1 AND entity_id = $2",
                &[&owner, &entity_id],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to delete recurring schedule: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }

    async fn mark_recurring_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: CyclePoint,
        date: &str,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows_affected = c
                .execute(
                    "UPDATE recurring_schedules
                     SET last_action = $1, last_date = $2, last_executed_at = $3
                     WHERE owner = $4 AND entity_id = $5",
                    &[&action.as_str(), &date, &at, &owner, &entity_id],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to mark recurring schedule executed: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            if rows_affected == 0 {
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Recurring schedule for {}/{} not found", owner, entity_id),
                )));
            }
        }

        Ok(())
    }

    async fn list_calendar_from(
        &self,
        date: &str,
    ) -> Result<Vec<CalendarSchedule>, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    &format!("SELECT {} FROM calendar_schedules", CALENDAR_COLUMNS),
                    &[],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query calendar schedules: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            let mut schedules = Vec::new();
            for row in &rows {
                let schedule = Self::calendar_from_row(row)?;
                if schedule.has_date_from(date) {
                    schedules.push(schedule);
                }
            }
            Ok(schedules)
        } else {
            Ok(Vec::new())
        }
    }

    async fn get_calendar(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<Option<CalendarSchedule>, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    &format!(
                        "SELECT {} FROM calendar_schedules WHERE owner = $1 AND entity_id = $2",
                        CALENDAR_COLUMNS
                    ),
                    &[&owner, &entity_id],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query calendar schedule: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            match rows.first() {
                Some(row) => Ok(Some(Self::calendar_from_row(row)?)),
                None => Ok(None),
            }
        } else {
            Ok(None)
        }
    }

    async fn upsert_calendar(
        &self,
        schedule: &CalendarSchedule,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        schedule.validate().map_err(|e| {
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
                as Box<dyn std::error::Error + Send + Sync>
        })?;

        // Shallow merge of new dates into the existing mapping
        let mut merged = match self.get_calendar(&schedule.owner, &schedule.entity_id).await? {
            Some(existing) => {
                let mut merged = existing;
                merged.timezone = schedule.timezone.clone();
                merged.merge_days(schedule.days.clone());
                merged
            }
            None => schedule.clone(),
        };
        merged.owner = schedule.owner.clone();
        merged.entity_id = schedule.entity_id.clone();

        let days_json = serde_json::to_string(&merged.days).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize calendar days: {}", e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "INSERT INTO calendar_schedules
                    (owner, entity_id, timezone, days_json, last_date, last_slot_id, last_action)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (owner, entity_id) DO UPDATE SET
                    timezone = EXCLUDED.timezone,
                    days_json = EXCLUDED.days_json",
                &[
                    &merged.owner,
                    &merged.entity_id,
                    &merged.timezone,
                    &days_json,
                    &merged.last_date,
                    &merged.last_slot_id,
                    &merged.last_action.map(|a| a.as_str()),
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to upsert calendar schedule: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;

            // Calendar schedules with live slots take priority over the
            // entity's recurring schedule
            if merged.has_enabled_slot() {
                c.execute(
                    "DELETE FROM recurring_schedules WHERE owner = $1 AND entity_id = $2",
                    &[&merged.owner, &merged.entity_id],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to remove superseded recurring schedule: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;
            }
        }

        Ok(())
    }

    async fn delete_calendar(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "DELETE FROM calendar_schedules WHERE owner = $1 AND entity_id = $2",
                &[&owner, &entity_id],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to delete calendar schedule: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }

    async fn mark_calendar_executed(
        &self,
        owner: &str,
        entity_id: &str,
        date: &str,
        slot_id: &str,
        action: SlotAction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "UPDATE calendar_schedules
                 SET last_date = $1, last_slot_id = $2, last_action = $3
                 WHERE owner = $4 AND entity_id = $5",
                &[&date, &slot_id, &action.as_str(), &owner, &entity_id],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to mark calendar schedule executed: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ExecutionHistoryStore for PostgresStore {
    async fn append(
        &self,
        record: &ExecutionRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "INSERT INTO execution_history
                    (id, owner, entity_id, schedule_date, slot_id, action, status, executed_at, error)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &record.id,
                    &record.owner,
                    &record.entity_id,
                    &record.schedule_date,
                    &record.slot_id,
                    &record.action.as_str(),
                    &record.status.as_str(),
                    &record.executed_at,
                    &record.error,
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to append execution record: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }

    async fn has_recent_success(
        &self,
        owner: &str,
        entity_id: &str,
        date: &str,
        slot_id: &str,
        action: SlotAction,
        within_minutes: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let cutoff = Utc::now() - Duration::minutes(within_minutes);
            let rows = c
                .query(
                    "SELECT 1 FROM execution_history
                     WHERE owner = $1 AND entity_id = $2 AND schedule_date = $3
                       AND slot_id = $4 AND action = $5 AND status = $6
                       AND executed_at >= $7
                     LIMIT 1",
                    &[
                        &owner,
                        &entity_id,
                        &date,
                        &slot_id,
                        &action.as_str(),
                        &ExecutionStatus::Success.as_str(),
                        &cutoff,
                    ],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query execution history: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            Ok(!rows.is_empty())
        } else {
            Ok(false)
        }
    }
}

#[async_trait]
impl StopLossStore for PostgresStore {
    async fn list_enabled(
        &self,
    ) -> Result<Vec<StopLossConfig>, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    "SELECT owner, entity_id, account_id, entity_name, enabled,
                            cost_per_result_enabled, cost_per_result_threshold,
                            zero_results_spend_enabled, zero_results_spend_threshold
                     FROM stop_loss_configs
                     WHERE enabled = TRUE",
                    &[],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query stop-loss configs: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            Ok(rows
                .iter()
                .map(|row| StopLossConfig {
                    owner: row.get(0),
                    entity_id: row.get(1),
                    account_id: row.get(2),
                    entity_name: row.get(3),
                    enabled: row.get(4),
                    cost_per_result_enabled: row.get(5),
                    cost_per_result_threshold: row.get(6),
                    zero_results_spend_enabled: row.get(7),
                    zero_results_spend_threshold: row.get(8),
                })
                .collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn disable(
        &self,
        owner: &str,
        entity_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "UPDATE stop_loss_configs SET enabled = FALSE
                 WHERE owner = $1 AND entity_id = $2",
                &[&owner, &entity_id],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to disable stop-loss config: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }

    async fn is_batch_enabled(
        &self,
        owner: &str,
        account_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    "SELECT enabled FROM account_batch_flags
                     WHERE owner = $1 AND account_id = $2",
                    &[&owner, &account_id],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query account batch flag: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            // Accounts without an explicit flag are processed
            Ok(rows.first().map(|row| row.get(0)).unwrap_or(true))
        } else {
            Ok(true)
        }
    }
}

#[async_trait]
impl RetryQueue for PostgresStore {
    async fn upsert_failure(
        &self,
        owner: &str,
        entity_id: &str,
        error: &str,
        max_retries: i32,
        base_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    "SELECT retry_count FROM retry_queue
                     WHERE owner = $1 AND entity_id = $2",
                    &[&owner, &entity_id],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query retry queue: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            let retry_count: i32 = rows
                .first()
                .map(|row| row.get::<_, i32>(0) + 1)
                .unwrap_or(0);
            let backoff_seconds = base_seconds.saturating_mul(1u64 << retry_count.min(16) as u32);
            let next_retry_at = now + Duration::seconds(backoff_seconds as i64);
            let status = if retry_count >= max_retries {
                "exhausted"
            } else {
                "pending"
            };

            c.execute(
                "INSERT INTO retry_queue
                    (owner, entity_id, error, retry_count, max_retries, next_retry_at, status)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (owner, entity_id) DO UPDATE SET
                    error = EXCLUDED.error,
                    retry_count = EXCLUDED.retry_count,
                    max_retries = EXCLUDED.max_retries,
                    next_retry_at = EXCLUDED.next_retry_at,
                    status = EXCLUDED.status",
                &[
                    &owner,
                    &entity_id,
                    &error,
                    &retry_count,
                    &max_retries,
                    &next_retry_at,
                    &status,
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to upsert retry entry: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialProvider for PostgresStore {
    async fn credential_for(
        &self,
        owner: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    "SELECT access_token FROM owner_credentials WHERE owner = $1",
                    &[&owner],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to query credential: {}",
                        e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })?;

            match rows.first() {
                Some(row) => Ok(row.get(0)),
                None => Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("No credential on file for owner {}", owner),
                ))),
            }
        } else {
            Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Database connection not available",
            )))
        }
    }
}

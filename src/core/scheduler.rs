//! Cron-based tick scheduler for enqueuing sweep jobs

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use cron::Schedule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Scheduler that enqueues one sweep job per cron tick.
///
/// The recurring/calendar sweep and the stop-loss sweep each get their own
/// instance with an independent interval.
pub struct SweepScheduler<J> {
    storage: Arc<RedisStorage<J>>,
    schedule: Schedule,
    name: &'static str,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl<J> SweepScheduler<J>
where
    J: Default + Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static,
{
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `storage` - Redis storage backend for the sweep job
    /// * `interval_seconds` - Tick interval in seconds (0 = disabled)
    /// * `name` - Sweep name used in logs
    pub fn new(
        storage: Arc<RedisStorage<J>>,
        interval_seconds: u64,
        name: &'static str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval_seconds == 0 {
            return Err(format!("Scheduler '{}' disabled: interval_seconds is 0", name).into());
        }

        // Cron format: second minute hour day month weekday
        let cron_expr = if interval_seconds >= 60 {
            let minutes = interval_seconds / 60;
            format!("0 */{} * * * *", minutes)
        } else {
            format!("*/{} * * * * *", interval_seconds)
        };

        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        info!(
            sweep = name,
            interval = interval_seconds,
            cron = %cron_expr,
            "SweepScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            storage,
            schedule,
            name,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let storage = self.storage.clone();
        let schedule = self.schedule.clone();
        let name = self.name;
        let handle_arc = self.handle.clone();

        let handle = tokio::spawn(async move {
            info!(sweep = name, "SweepScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                let mut storage_clone = (*storage).clone();
                match storage_clone.push(J::default()).await {
                    Ok(_) => {
                        debug!(sweep = name, "SweepScheduler: enqueued sweep job");
                    }
                    Err(e) => {
                        error!(
                            sweep = name,
                            error = %e,
                            "SweepScheduler: failed to enqueue sweep job"
                        );
                    }
                }
            }
        });

        {
            let mut h = handle_arc.write().await;
            *h = Some(handle);
        }

        info!(sweep = self.name, "SweepScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!(sweep = self.name, "SweepScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}

//! Adpulse Worker
//!
//! Runs the recurring/calendar schedule sweeps and the stop-loss batch sweep
//! on independent cron ticks. Can be scaled to multiple instances; the
//! calendar evaluator re-reads durable state per schedule to stay safe across
//! processes.

use adpulse::config::{self, WorkerSettings};
use adpulse::core::runtime::SweepRuntime;
use adpulse::core::scheduler::SweepScheduler;
use adpulse::db::{PostgresStore, RecurringScheduleCache};
use adpulse::engine::{CalendarSweep, RecurringSweep, StopLossSweep};
use adpulse::jobs::context::JobContext;
use adpulse::jobs::types::{ScheduleSweepJob, StopLossSweepJob};
use adpulse::logging;
use adpulse::metrics::Metrics;
use adpulse::services::adgraph::{AdGraphClient, HttpAdGraphClient};
use adpulse::services::credentials::CredentialProvider;
use adpulse::services::notify::{LogNotificationSink, NotificationSink};
use adpulse::services::quota::{RateBudget, SlidingWindowBudget};
use apalis_redis::RedisStorage;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let env = config::get_environment();
    let settings = WorkerSettings::from_env();
    info!("Starting Adpulse Worker");
    info!(environment = %env, "Environment");
    info!(
        schedule_interval = settings.schedule_interval_seconds,
        stoploss_interval = settings.stoploss_interval_seconds,
        max_parallel_groups = settings.max_parallel_groups,
        "Sweep settings"
    );

    // Initialize metrics
    let metrics = Arc::new(Metrics::new()?);

    // Initialize Postgres (required: schedules, configs, history, retry queue)
    info!("Initializing Postgres connection...");
    let store = PostgresStore::new()
        .await
        .map_err(|e| format!("Postgres connection required for worker: {}", e))?;
    let store = Arc::new(store);
    metrics.database_connected.set(1.0);
    info!("Postgres connected");

    // Collaborators
    let adgraph: Arc<dyn AdGraphClient> =
        Arc::new(HttpAdGraphClient::new(config::get_adgraph_base_url()));
    let credentials: Arc<dyn CredentialProvider> = store.clone();
    let notifier: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink);
    let budget: Arc<dyn RateBudget> =
        Arc::new(SlidingWindowBudget::new(settings.max_batch_calls_per_hour));

    // Recurring schedules go through a read-through cache; calendar
    // evaluation reads the store directly
    let cache = Arc::new(RecurringScheduleCache::new(
        store.clone(),
        Duration::from_secs(settings.cache_ttl_seconds),
    ));

    let recurring = RecurringSweep::new(
        cache,
        adgraph.clone(),
        credentials.clone(),
        notifier.clone(),
    );
    let calendar = CalendarSweep::new(
        store.clone(),
        store.clone(),
        adgraph.clone(),
        credentials.clone(),
        notifier.clone(),
    );
    let stoploss = StopLossSweep::new(
        store.clone(),
        store.clone(),
        adgraph,
        credentials,
        notifier,
        budget,
        settings.clone(),
    );

    // Initialize Apalis storage backends
    info!("Initializing Apalis Redis storage...");
    let redis_url = config::get_redis_url();
    let conn = apalis_redis::connect(redis_url.clone()).await?;
    let schedule_storage: Arc<RedisStorage<ScheduleSweepJob>> =
        Arc::new(RedisStorage::new(conn.clone()));
    let stoploss_storage: Arc<RedisStorage<StopLossSweepJob>> =
        Arc::new(RedisStorage::new(conn));
    info!("Apalis Redis storage initialized");

    // Create job context
    let job_context = Arc::new(JobContext::new(
        recurring,
        calendar,
        stoploss,
        Some(metrics.clone()),
    ));

    // Initialize and start the workers
    info!("Starting Apalis workers...");
    let runtime = SweepRuntime::new(
        job_context,
        schedule_storage.clone(),
        stoploss_storage.clone(),
    );
    let worker_handles = runtime
        .start_workers()
        .await
        .map_err(|e| format!("Failed to start workers: {}", e))?;

    // Initialize and start the tick schedulers
    info!("Starting sweep schedulers...");
    let schedule_scheduler = SweepScheduler::new(
        schedule_storage,
        settings.schedule_interval_seconds,
        "schedule",
    )
    .map_err(|e| format!("Failed to create schedule scheduler: {}", e))?;
    schedule_scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start schedule scheduler: {}", e))?;

    let stoploss_scheduler = SweepScheduler::new(
        stoploss_storage,
        settings.stoploss_interval_seconds,
        "stop-loss",
    )
    .map_err(|e| format!("Failed to create stop-loss scheduler: {}", e))?;
    stoploss_scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start stop-loss scheduler: {}", e))?;

    // Graceful shutdown
    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            schedule_scheduler.stop().await;
            stoploss_scheduler.stop().await;
            for handle in worker_handles {
                handle.abort();
            }
            info!("Worker stopped");
        }
    }

    Ok(())
}

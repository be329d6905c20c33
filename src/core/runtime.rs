//! Apalis worker setup for the sweep jobs

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::{ScheduleSweepJob, StopLossSweepJob};

/// Sweep runtime that sets up one Apalis worker per sweep kind
pub struct SweepRuntime {
    job_context: Arc<JobContext>,
    schedule_storage: Arc<RedisStorage<ScheduleSweepJob>>,
    stoploss_storage: Arc<RedisStorage<StopLossSweepJob>>,
}

impl SweepRuntime {
    pub fn new(
        job_context: Arc<JobContext>,
        schedule_storage: Arc<RedisStorage<ScheduleSweepJob>>,
        stoploss_storage: Arc<RedisStorage<StopLossSweepJob>>,
    ) -> Self {
        Self {
            job_context,
            schedule_storage,
            stoploss_storage,
        }
    }

    /// Start both workers and return handles for graceful shutdown
    pub async fn start_workers(
        &self,
    ) -> Result<Vec<tokio::task::JoinHandle<()>>, Box<dyn std::error::Error + Send + Sync>> {
        let mut handles = Vec::new();

        // Worker for ScheduleSweepJob
        let schedule_storage = (*self.schedule_storage).clone();
        let job_context = self.job_context.clone();
        let schedule_handle = tokio::spawn(async move {
            let worker = WorkerBuilder::new("schedule-sweep-worker")
                .data(job_context.clone())
                .backend(schedule_storage)
                .build_fn(handlers::handle_schedule_sweep);

            info!("SweepRuntime: ScheduleSweepJob worker started");
            worker.run().await;
        });
        handles.push(schedule_handle);

        // Worker for StopLossSweepJob
        let stoploss_storage = (*self.stoploss_storage).clone();
        let job_context_stoploss = self.job_context.clone();
        let stoploss_handle = tokio::spawn(async move {
            let worker = WorkerBuilder::new("stop-loss-sweep-worker")
                .data(job_context_stoploss.clone())
                .backend(stoploss_storage)
                .build_fn(handlers::handle_stop_loss_sweep);

            info!("SweepRuntime: StopLossSweepJob worker started");
            worker.run().await;
        });
        handles.push(stoploss_handle);

        info!("SweepRuntime: all workers started");
        Ok(handles)
    }
}

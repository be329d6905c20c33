//! Prometheus metrics for the sweep workers

use prometheus::{Gauge, Histogram, HistogramOpts, IntCounter, Registry};

/// Metrics tracked across schedule and stop-loss sweeps
pub struct Metrics {
    pub registry: Registry,
    /// Recurring cycle transitions applied to the ad graph
    pub schedule_transitions_total: IntCounter,
    /// Calendar slot executions applied to the ad graph
    pub calendar_executions_total: IntCounter,
    /// Stop-loss rules fired (entity paused)
    pub stoploss_triggers_total: IntCounter,
    /// External ad-graph call failures, any sweep
    pub adgraph_errors_total: IntCounter,
    /// Entities pushed to the retry queue
    pub retry_enqueued_total: IntCounter,
    /// Ticks skipped because the previous sweep was still running
    pub sweeps_skipped_total: IntCounter,
    /// Wall time of a full sweep pass
    pub sweep_duration_seconds: Histogram,
    /// 1 when the Postgres connection is up
    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let schedule_transitions_total = IntCounter::new(
            "adpulse_schedule_transitions_total",
            "Recurring schedule transitions executed",
        )?;
        let calendar_executions_total = IntCounter::new(
            "adpulse_calendar_executions_total",
            "Calendar slot executions applied",
        )?;
        let stoploss_triggers_total = IntCounter::new(
            "adpulse_stoploss_triggers_total",
            "Stop-loss rules fired",
        )?;
        let adgraph_errors_total = IntCounter::new(
            "adpulse_adgraph_errors_total",
            "External ad-graph call failures",
        )?;
        let retry_enqueued_total = IntCounter::new(
            "adpulse_retry_enqueued_total",
            "Entities pushed to the retry queue",
        )?;
        let sweeps_skipped_total = IntCounter::new(
            "adpulse_sweeps_skipped_total",
            "Ticks skipped due to an in-flight sweep",
        )?;
        let sweep_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "adpulse_sweep_duration_seconds",
            "Duration of a full sweep pass",
        ))?;
        let database_connected =
            Gauge::new("adpulse_database_connected", "Postgres connection status")?;

        registry.register(Box::new(schedule_transitions_total.clone()))?;
        registry.register(Box::new(calendar_executions_total.clone()))?;
        registry.register(Box::new(stoploss_triggers_total.clone()))?;
        registry.register(Box::new(adgraph_errors_total.clone()))?;
        registry.register(Box::new(retry_enqueued_total.clone()))?;
        registry.register(Box::new(sweeps_skipped_total.clone()))?;
        registry.register(Box::new(sweep_duration_seconds.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            schedule_transitions_total,
            calendar_executions_total,
            stoploss_triggers_total,
            adgraph_errors_total,
            retry_enqueued_total,
            sweeps_skipped_total,
            sweep_duration_seconds,
            database_connected,
        })
    }
}

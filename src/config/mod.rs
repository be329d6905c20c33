//! Environment-based configuration
//!
//! All runtime knobs come from environment variables (loaded from `.env` in
//! development via dotenvy). Getters fall back to sensible defaults so the
//! worker can start with nothing but database/redis URLs configured.

use std::env;

/// Current deployment environment ("production", "sandbox", ...)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Postgres connection string for the schedule/stop-loss store
pub fn get_database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| "host=localhost user=adpulse dbname=adpulse".to_string())
}

/// Redis URL for the apalis job queue
pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Base URL of the external ad-graph API
pub fn get_adgraph_base_url() -> String {
    env::var("ADGRAPH_BASE_URL").unwrap_or_else(|_| "https://graph.facebook.com/v19.0".to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Tunables for the sweep workers
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Interval of the recurring/calendar schedule sweep, in seconds
    pub schedule_interval_seconds: u64,
    /// Interval of the stop-loss batch sweep, in seconds
    pub stoploss_interval_seconds: u64,
    /// Maximum (owner, account) groups processed concurrently per stop-loss sweep
    pub max_parallel_groups: usize,
    /// Delay between group chunks, bounds burst load on the external API
    pub inter_chunk_delay_ms: u64,
    /// TTL of the recurring-schedule read-through cache, in seconds
    pub cache_ttl_seconds: u64,
    /// Base of the exponential retry backoff for the retry queue, in seconds
    pub retry_base_seconds: u64,
    /// Maximum retry attempts recorded on a retry queue entry
    pub max_retries: i32,
    /// Batched ad-graph calls allowed per (owner, account) per hour
    pub max_batch_calls_per_hour: usize,
}

impl WorkerSettings {
    pub fn from_env() -> Self {
        Self {
            schedule_interval_seconds: env_u64("SCHEDULE_INTERVAL_SECONDS", 60),
            stoploss_interval_seconds: env_u64("STOPLOSS_INTERVAL_SECONDS", 300),
            max_parallel_groups: env_usize("MAX_PARALLEL_GROUPS", 4),
            inter_chunk_delay_ms: env_u64("INTER_CHUNK_DELAY_MS", 1000),
            cache_ttl_seconds: env_u64("SCHEDULE_CACHE_TTL_SECONDS", 300),
            retry_base_seconds: env_u64("RETRY_BASE_SECONDS", 60),
            max_retries: env_u64("MAX_RETRIES", 6) as i32,
            max_batch_calls_per_hour: env_usize("MAX_BATCH_CALLS_PER_HOUR", 200),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            schedule_interval_seconds: 60,
            stoploss_interval_seconds: 300,
            max_parallel_groups: 4,
            inter_chunk_delay_ms: 1000,
            cache_ttl_seconds: 300,
            retry_base_seconds: 60,
            max_retries: 6,
            max_batch_calls_per_hour: 200,
        }
    }
}

//! Per-account rate/quota budget for batched ad-graph calls

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[async_trait]
pub trait RateBudget: Send + Sync {
    /// Whether another batched call against (owner, account) fits the budget
    async fn can_proceed(&self, owner: &str, account: &str) -> bool;

    /// Suggested backoff when the budget is exhausted
    async fn wait_time_ms(&self, owner: &str, account: &str) -> u64;

    /// Record that a batched call was made
    async fn record_call(&self, owner: &str, account: &str);
}

/// Sliding one-hour window budget held in process memory
pub struct SlidingWindowBudget {
    max_calls_per_hour: usize,
    calls: Mutex<HashMap<(String, String), Vec<i64>>>,
}

impl SlidingWindowBudget {
    pub fn new(max_calls_per_hour: usize) -> Self {
        Self {
            max_calls_per_hour,
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn window_start() -> i64 {
        Utc::now().timestamp() - 3600
    }
}

#[async_trait]
impl RateBudget for SlidingWindowBudget {
    async fn can_proceed(&self, owner: &str, account: &str) -> bool {
        let cutoff = Self::window_start();
        let mut calls = self.calls.lock().await;
        let entry = calls
            .entry((owner.to_string(), account.to_string()))
            .or_default();
        entry.retain(|t| *t >= cutoff);
        entry.len() < self.max_calls_per_hour
    }

    async fn wait_time_ms(&self, owner: &str, account: &str) -> u64 {
        let cutoff = Self::window_start();
        let calls = self.calls.lock().await;
        match calls.get(&(owner.to_string(), account.to_string())) {
            Some(entry) => {
                // Wait until the oldest call inside the window ages out
                let oldest = entry.iter().filter(|t| **t >= cutoff).min().copied();
                match oldest {
                    Some(ts) => ((ts - cutoff).max(0) as u64) * 1000,
                    None => 0,
                }
            }
            None => 0,
        }
    }

    async fn record_call(&self, owner: &str, account: &str) {
        let mut calls = self.calls.lock().await;
        calls
            .entry((owner.to_string(), account.to_string()))
            .or_default()
            .push(Utc::now().timestamp());
    }
}

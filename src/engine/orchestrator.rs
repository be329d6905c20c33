//! Stop-loss batch orchestrator
//!
//! One pass: load enabled configs, group by (owner, account) to minimize
//! batched ad-graph calls, drop accounts with batch processing switched off,
//! then per group fetch metrics in one call, evaluate thresholds, and pause
//! every triggered entity in one call. Groups fan out in bounded chunks with
//! an inter-chunk delay to cap burst load. Failures degrade per entity into
//! the retry queue; nothing aborts the pass.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::WorkerSettings;
use crate::db::store::{RetryQueue, StopLossStore};
use crate::engine::stoploss;
use crate::models::execution::EntityStatus;
use crate::models::stoploss::{StopLossConfig, StopLossTrigger};
use crate::services::adgraph::AdGraphClient;
use crate::services::credentials::CredentialProvider;
use crate::services::notify::NotificationSink;
use crate::services::quota::RateBudget;

/// Metrics date preset requested from the ad graph
const DATE_PRESET: &str = "today";

/// Outcome counters for one stop-loss pass
#[derive(Debug, Default, Clone, Copy)]
pub struct StopLossStats {
    pub groups: usize,
    pub evaluated: usize,
    pub triggered: usize,
    pub retried: usize,
}

impl StopLossStats {
    fn absorb(&mut self, other: StopLossStats) {
        self.groups += other.groups;
        self.evaluated += other.evaluated;
        self.triggered += other.triggered;
        self.retried += other.retried;
    }
}

pub struct StopLossSweep {
    store: Arc<dyn StopLossStore>,
    retry_queue: Arc<dyn RetryQueue>,
    adgraph: Arc<dyn AdGraphClient>,
    credentials: Arc<dyn CredentialProvider>,
    notifier: Arc<dyn NotificationSink>,
    budget: Arc<dyn RateBudget>,
    settings: WorkerSettings,
}

impl StopLossSweep {
    pub fn new(
        store: Arc<dyn StopLossStore>,
        retry_queue: Arc<dyn RetryQueue>,
        adgraph: Arc<dyn AdGraphClient>,
        credentials: Arc<dyn CredentialProvider>,
        notifier: Arc<dyn NotificationSink>,
        budget: Arc<dyn RateBudget>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            store,
            retry_queue,
            adgraph,
            credentials,
            notifier,
            budget,
            settings,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> StopLossStats {
        let mut stats = StopLossStats::default();

        let configs = match self.store.list_enabled().await {
            Ok(configs) => configs,
            Err(e) => {
                warn!(error = %e, "StopLossSweep: failed to list configs, skipping pass");
                return stats;
            }
        };

        let mut groups: HashMap<(String, String), Vec<StopLossConfig>> = HashMap::new();
        for config in configs {
            if config.is_inert() {
                continue;
            }
            groups
                .entry((config.owner.clone(), config.account_id.clone()))
                .or_default()
                .push(config);
        }

        let mut active_groups = Vec::new();
        for ((owner, account), members) in groups {
            match self.store.is_batch_enabled(&owner, &account).await {
                Ok(true) => active_groups.push((owner, account, members)),
                Ok(false) => {
                    debug!(owner = %owner, account = %account, "StopLossSweep: batch disabled for account");
                }
                Err(e) => {
                    // Flag lookup failure defaults to processing the group
                    warn!(owner = %owner, account = %account, error = %e, "StopLossSweep: batch flag lookup failed");
                    active_groups.push((owner, account, members));
                }
            }
        }

        let chunk_size = self.settings.max_parallel_groups.max(1);
        let chunk_count = active_groups.len().div_ceil(chunk_size);
        for (i, chunk) in active_groups.chunks(chunk_size).enumerate() {
            let outcomes = join_all(
                chunk
                    .iter()
                    .map(|(owner, account, members)| self.process_group(owner, account, members, now)),
            )
            .await;
            for outcome in outcomes {
                stats.absorb(outcome);
            }
            if i + 1 < chunk_count {
                tokio::time::sleep(Duration::from_millis(self.settings.inter_chunk_delay_ms)).await;
            }
        }

        info!(
            groups = stats.groups,
            evaluated = stats.evaluated,
            triggered = stats.triggered,
            retried = stats.retried,
            "StopLossSweep: pass complete"
        );
        stats
    }

    async fn process_group(
        &self,
        owner: &str,
        account: &str,
        members: &[StopLossConfig],
        now: DateTime<Utc>,
    ) -> StopLossStats {
        let mut stats = StopLossStats {
            groups: 1,
            ..Default::default()
        };

        if !self.budget.can_proceed(owner, account).await {
            let wait_ms = self.budget.wait_time_ms(owner, account).await;
            debug!(
                owner = %owner,
                account = %account,
                wait_ms,
                "StopLossSweep: near quota, backing off"
            );
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        let credential = match self.credentials.credential_for(owner).await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(owner = %owner, error = %e, "StopLossSweep: no credential, queueing group for retry");
                for config in members {
                    self.enqueue_retry(config, &format!("missing credential: {}", e), now, &mut stats)
                        .await;
                }
                return stats;
            }
        };

        let entity_ids: Vec<String> = members.iter().map(|c| c.entity_id.clone()).collect();

        self.budget.record_call(owner, account).await;
        let metrics_map = match self
            .adgraph
            .get_metrics_batch(&credential, &entity_ids, DATE_PRESET)
            .await
        {
            Ok(map) => map,
            Err(e) if e.is_transient() => {
                // Transient failures are never firm; the next tick retries
                debug!(owner = %owner, account = %account, error = %e, "StopLossSweep: transient metrics failure");
                return stats;
            }
            Err(e) => {
                warn!(owner = %owner, account = %account, error = %e, "StopLossSweep: metrics fetch failed");
                for config in members {
                    self.enqueue_retry(config, &format!("metrics fetch failed: {}", e), now, &mut stats)
                        .await;
                }
                return stats;
            }
        };

        let mut to_stop: Vec<(&StopLossConfig, StopLossTrigger)> = Vec::new();
        for config in members {
            match metrics_map.get(&config.entity_id) {
                Some(metrics) => {
                    stats.evaluated += 1;
                    if let Some(trigger) = stoploss::evaluate(config, *metrics) {
                        to_stop.push((config, trigger));
                    }
                }
                None => {
                    self.enqueue_retry(config, "metrics missing from batch response", now, &mut stats)
                        .await;
                }
            }
        }

        if to_stop.is_empty() {
            return stats;
        }

        let stop_ids: Vec<String> = to_stop.iter().map(|(c, _)| c.entity_id.clone()).collect();
        self.budget.record_call(owner, account).await;
        let mut pause_results = match self
            .adgraph
            .set_status_batch(&credential, &stop_ids, EntityStatus::Paused)
            .await
        {
            Ok(results) => results,
            Err(e) if e.is_transient() => {
                debug!(owner = %owner, account = %account, error = %e, "StopLossSweep: transient pause failure");
                return stats;
            }
            Err(e) => {
                warn!(owner = %owner, account = %account, error = %e, "StopLossSweep: batch pause failed");
                for (config, _) in &to_stop {
                    self.enqueue_retry(config, &format!("pause failed: {}", e), now, &mut stats)
                        .await;
                }
                return stats;
            }
        };

        for (config, trigger) in &to_stop {
            match pause_results.remove(&config.entity_id) {
                Some(Ok(())) => {
                    // Self-terminating: a fired config stops consuming
                    // evaluation and API spend
                    if let Err(e) = self.store.disable(&config.owner, &config.entity_id).await {
                        warn!(
                            entity_id = %config.entity_id,
                            error = %e,
                            "StopLossSweep: failed to disable config after pause"
                        );
                    }
                    info!(
                        owner = %config.owner,
                        entity_id = %config.entity_id,
                        entity_name = %config.entity_name,
                        rule = ?trigger.rule,
                        threshold = trigger.threshold,
                        actual = trigger.actual,
                        "StopLossSweep: entity paused by stop-loss"
                    );
                    if let Err(e) = self
                        .notifier
                        .stop_loss_triggered(
                            &config.owner,
                            &config.entity_id,
                            &config.entity_name,
                            trigger,
                        )
                        .await
                    {
                        warn!(error = %e, "StopLossSweep: notification failed");
                    }
                    stats.triggered += 1;
                }
                Some(Err(e)) => {
                    self.enqueue_retry(config, &format!("pause failed: {}", e), now, &mut stats)
                        .await;
                }
                None => {
                    self.enqueue_retry(config, "missing batch pause result", now, &mut stats)
                        .await;
                }
            }
        }

        stats
    }

    async fn enqueue_retry(
        &self,
        config: &StopLossConfig,
        error: &str,
        now: DateTime<Utc>,
        stats: &mut StopLossStats,
    ) {
        if let Err(e) = self
            .retry_queue
            .upsert_failure(
                &config.owner,
                &config.entity_id,
                error,
                self.settings.max_retries,
                self.settings.retry_base_seconds,
                now,
            )
            .await
        {
            warn!(
                entity_id = %config.entity_id,
                error = %e,
                "StopLossSweep: retry queue upsert failed"
            );
            return;
        }
        stats.retried += 1;
    }
}

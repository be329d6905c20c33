//! Stop-loss configuration and evaluation models

use serde::{Deserialize, Serialize};

/// Per-entity stop-loss configuration.
///
/// The orchestrator flips `enabled` off once the entity is paused, so a fired
/// rule is self-terminating and stops consuming API quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopLossConfig {
    pub owner: String,
    pub entity_id: String,
    pub account_id: String,
    pub entity_name: String,
    pub enabled: bool,
    pub cost_per_result_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_result_threshold: Option<f64>,
    pub zero_results_spend_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_results_spend_threshold: Option<f64>,
}

impl StopLossConfig {
    /// True when neither rule can ever fire for this entity
    pub fn is_inert(&self) -> bool {
        let cpr_live = self.cost_per_result_enabled && self.cost_per_result_threshold.is_some();
        let zrs_live =
            self.zero_results_spend_enabled && self.zero_results_spend_threshold.is_some();
        !cpr_live && !zrs_live
    }
}

/// Spend and result metrics for one entity over the evaluation period
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub spend: f64,
    pub results: i64,
}

/// Which threshold rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerRule {
    CostPerResult,
    ZeroResultsSpend,
}

/// A fired stop-loss decision, carried downstream for notification/audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopLossTrigger {
    pub rule: TriggerRule,
    pub threshold: f64,
    /// Observed value that crossed the threshold: cost-per-result for rule A,
    /// raw spend for rule B
    pub actual: f64,
}

//! Stop-loss threshold evaluation
//!
//! Pure decision logic, no I/O. The two rules partition on `results`, so at
//! most one can apply to any evaluation and no tie-break is needed.

use crate::models::stoploss::{EntityMetrics, StopLossConfig, StopLossTrigger, TriggerRule};

/// Decide whether `metrics` cross one of the configured thresholds.
///
/// Rule A (cost-per-result): applies when results were delivered; fires when
/// spend per result reaches the threshold.
/// Rule B (zero-results-spend): applies when nothing was delivered; fires
/// when raw spend reaches the threshold.
pub fn evaluate(config: &StopLossConfig, metrics: EntityMetrics) -> Option<StopLossTrigger> {
    if metrics.results > 0 {
        if config.cost_per_result_enabled {
            if let Some(threshold) = config.cost_per_result_threshold {
                let cost_per_result = metrics.spend / metrics.results as f64;
                if cost_per_result >= threshold {
                    return Some(StopLossTrigger {
                        rule: TriggerRule::CostPerResult,
                        threshold,
                        actual: cost_per_result,
                    });
                }
            }
        }
    } else if config.zero_results_spend_enabled {
        if let Some(threshold) = config.zero_results_spend_threshold {
            if metrics.spend >= threshold {
                return Some(StopLossTrigger {
                    rule: TriggerRule::ZeroResultsSpend,
                    threshold,
                    actual: metrics.spend,
                });
            }
        }
    }

    None
}

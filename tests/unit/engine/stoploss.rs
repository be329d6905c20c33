use adpulse::engine::stoploss::evaluate;
use adpulse::models::stoploss::{EntityMetrics, TriggerRule};

use crate::test_utils::stoploss_config;

fn metrics(spend: f64, results: i64) -> EntityMetrics {
    EntityMetrics { spend, results }
}

#[test]
fn zero_results_spend_fires_on_raw_spend() {
    let config = stoploss_config("o1", "e1", "a1", None, Some(40.0));
    let trigger = evaluate(&config, metrics(50.0, 0)).unwrap();
    assert_eq!(trigger.rule, TriggerRule::ZeroResultsSpend);
    assert_eq!(trigger.threshold, 40.0);
    assert_eq!(trigger.actual, 50.0);
}

#[test]
fn zero_results_spend_holds_below_threshold() {
    let config = stoploss_config("o1", "e1", "a1", None, Some(40.0));
    assert!(evaluate(&config, metrics(30.0, 0)).is_none());
}

#[test]
fn threshold_crossing_is_inclusive() {
    let config = stoploss_config("o1", "e1", "a1", None, Some(40.0));
    assert!(evaluate(&config, metrics(40.0, 0)).is_some());

    let config = stoploss_config("o1", "e1", "a1", Some(10.0), None);
    assert!(evaluate(&config, metrics(50.0, 5)).is_some());
}

#[test]
fn cost_per_result_fires_on_the_ratio() {
    let config = stoploss_config("o1", "e1", "a1", Some(9.0), None);
    let trigger = evaluate(&config, metrics(50.0, 5)).unwrap();
    assert_eq!(trigger.rule, TriggerRule::CostPerResult);
    assert_eq!(trigger.threshold, 9.0);
    assert_eq!(trigger.actual, 10.0);
}

#[test]
fn cost_per_result_holds_below_threshold() {
    let config = stoploss_config("o1", "e1", "a1", Some(11.0), None);
    assert!(evaluate(&config, metrics(50.0, 5)).is_none());
}

#[test]
fn rules_partition_on_results() {
    // With results delivered, only the cost-per-result rule can apply; heavy
    // spend never reaches the zero-results rule
    let config = stoploss_config("o1", "e1", "a1", None, Some(40.0));
    assert!(evaluate(&config, metrics(1000.0, 1)).is_none());

    // With zero results, only the zero-results rule can apply
    let config = stoploss_config("o1", "e1", "a1", Some(1.0), None);
    assert!(evaluate(&config, metrics(1000.0, 0)).is_none());
}

#[test]
fn disabled_rule_never_fires() {
    let mut config = stoploss_config("o1", "e1", "a1", Some(1.0), Some(1.0));
    config.cost_per_result_enabled = false;
    config.zero_results_spend_enabled = false;
    assert!(evaluate(&config, metrics(1000.0, 5)).is_none());
    assert!(evaluate(&config, metrics(1000.0, 0)).is_none());
}

#[test]
fn enabled_rule_without_threshold_never_fires() {
    let mut config = stoploss_config("o1", "e1", "a1", None, None);
    config.cost_per_result_enabled = true;
    config.zero_results_spend_enabled = true;
    assert!(evaluate(&config, metrics(1000.0, 5)).is_none());
    assert!(evaluate(&config, metrics(1000.0, 0)).is_none());
    assert!(config.is_inert());
}

//! Notification/audit sink
//!
//! Fire-and-forget: the engine records what it did, delivery is someone
//! else's problem. Sink failures are logged and swallowed by callers, never
//! propagated, since they must not block an already-committed status change.

use async_trait::async_trait;
use tracing::info;

use crate::models::schedule::SlotAction;
use crate::models::stoploss::StopLossTrigger;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn schedule_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn stop_loss_triggered(
        &self,
        owner: &str,
        entity_id: &str,
        entity_name: &str,
        trigger: &StopLossTrigger,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn slot_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: SlotAction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default sink that records to the structured log only
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn schedule_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(owner = %owner, entity_id = %entity_id, action = %action, "schedule transition executed");
        Ok(())
    }

    async fn stop_loss_triggered(
        &self,
        owner: &str,
        entity_id: &str,
        entity_name: &str,
        trigger: &StopLossTrigger,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            owner = %owner,
            entity_id = %entity_id,
            entity_name = %entity_name,
            rule = ?trigger.rule,
            threshold = trigger.threshold,
            actual = trigger.actual,
            "stop-loss triggered, entity paused"
        );
        Ok(())
    }

    async fn slot_executed(
        &self,
        owner: &str,
        entity_id: &str,
        action: SlotAction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(owner = %owner, entity_id = %entity_id, action = %action.as_str(), "calendar slot executed");
        Ok(())
    }
}

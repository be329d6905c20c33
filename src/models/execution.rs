//! Execution history and external entity status models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::schedule::SlotAction;

/// Delivery status of an ad entity on the external platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityStatus {
    Active,
    Paused,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Active => "ACTIVE",
            EntityStatus::Paused => "PAUSED",
        }
    }
}

/// Outcome recorded for one slot execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
    Pending,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
            ExecutionStatus::Pending => "pending",
        }
    }
}

/// Append-only record of one calendar slot execution.
///
/// Consulted by the slot evaluator to suppress duplicate external calls when
/// the same (date, slot, action) already succeeded within the lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub owner: String,
    pub entity_id: String,
    pub schedule_date: String,
    pub slot_id: String,
    pub action: SlotAction,
    pub status: ExecutionStatus,
    pub executed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    pub fn success(
        owner: &str,
        entity_id: &str,
        schedule_date: &str,
        slot_id: &str,
        action: SlotAction,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            entity_id: entity_id.to_string(),
            schedule_date: schedule_date.to_string(),
            slot_id: slot_id.to_string(),
            action,
            status: ExecutionStatus::Success,
            executed_at,
            error: None,
        }
    }

    pub fn error(
        owner: &str,
        entity_id: &str,
        schedule_date: &str,
        slot_id: &str,
        action: SlotAction,
        executed_at: DateTime<Utc>,
        error: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            entity_id: entity_id.to_string(),
            schedule_date: schedule_date.to_string(),
            slot_id: slot_id.to_string(),
            action,
            status: ExecutionStatus::Error,
            executed_at,
            error: Some(error),
        }
    }
}

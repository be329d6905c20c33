//! Schedule data models: recurring daily cycles and calendar day-slots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::execution::EntityStatus;

/// Position in the daily recurring cycle.
///
/// The cycle order lives entirely in [`CyclePoint::next`]; everything else
/// derives ordering from it so illegal sequences are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CyclePoint {
    Stop1,
    Active1,
    Stop2,
    Active2,
}

impl CyclePoint {
    /// The point expected after `self`, or `None` when the day's cycle is
    /// complete (tomorrow restarts at `Stop1`).
    pub fn next(self, four_point: bool) -> Option<CyclePoint> {
        match self {
            CyclePoint::Stop1 => Some(CyclePoint::Active1),
            CyclePoint::Active1 => {
                if four_point {
                    Some(CyclePoint::Stop2)
                } else {
                    None
                }
            }
            CyclePoint::Stop2 => Some(CyclePoint::Active2),
            CyclePoint::Active2 => None,
        }
    }

    /// Entity status this point drives the campaign to
    pub fn desired_status(self) -> EntityStatus {
        match self {
            CyclePoint::Stop1 | CyclePoint::Stop2 => EntityStatus::Paused,
            CyclePoint::Active1 | CyclePoint::Active2 => EntityStatus::Active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CyclePoint::Stop1 => "STOP_1",
            CyclePoint::Active1 => "ACTIVE_1",
            CyclePoint::Stop2 => "STOP_2",
            CyclePoint::Active2 => "ACTIVE_2",
        }
    }

    pub fn parse(s: &str) -> Option<CyclePoint> {
        match s {
            "STOP_1" => Some(CyclePoint::Stop1),
            "ACTIVE_1" => Some(CyclePoint::Active1),
            "STOP_2" => Some(CyclePoint::Stop2),
            "ACTIVE_2" => Some(CyclePoint::Active2),
            _ => None,
        }
    }
}

/// Daily recurring schedule for one campaign
///
/// `stop2`/`active2` are both set (4-point cycle) or both absent (2-point).
/// At most one recurring schedule exists per (owner, entity); upserts replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringSchedule {
    pub owner: String,
    pub entity_id: String,
    /// IANA timezone name the transition minutes are expressed in
    pub timezone: String,
    pub stop1: u32,
    pub active1: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop2: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active2: Option<u32>,
    /// Last transition executed, drives the next expected point
    pub last_action: Option<CyclePoint>,
    /// Local date ("YYYY-MM-DD") the last transition executed on
    pub last_date: Option<String>,
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl RecurringSchedule {
    pub fn is_four_point(&self) -> bool {
        self.stop2.is_some() && self.active2.is_some()
    }

    /// Target minute-of-day for a cycle point, `None` when the point does not
    /// exist in a 2-point schedule
    pub fn target_minute(&self, point: CyclePoint) -> Option<u32> {
        match point {
            CyclePoint::Stop1 => Some(self.stop1),
            CyclePoint::Active1 => Some(self.active1),
            CyclePoint::Stop2 => self.stop2,
            CyclePoint::Active2 => self.active2,
        }
    }

    /// Cycle points of this schedule in fire order
    pub fn points(&self) -> Vec<CyclePoint> {
        if self.is_four_point() {
            vec![
                CyclePoint::Stop1,
                CyclePoint::Active1,
                CyclePoint::Stop2,
                CyclePoint::Active2,
            ]
        } else {
            vec![CyclePoint::Stop1, CyclePoint::Active1]
        }
    }

    /// Final point of the day's cycle
    pub fn final_point(&self) -> CyclePoint {
        if self.is_four_point() {
            CyclePoint::Active2
        } else {
            CyclePoint::Active1
        }
    }

    /// Minute bounds and 2/4-point pairing sanity check
    pub fn validate(&self) -> Result<(), String> {
        for m in [Some(self.stop1), Some(self.active1), self.stop2, self.active2]
            .into_iter()
            .flatten()
        {
            if m > 1439 {
                return Err(format!("minute-of-day out of range: {}", m));
            }
        }
        if self.stop2.is_some() != self.active2.is_some() {
            return Err("stop2 and active2 must both be set or both absent".to_string());
        }
        Ok(())
    }
}

/// One start/stop window inside a calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub start_minute: u32,
    pub stop_minute: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl TimeSlot {
    pub fn new(start_minute: u32, stop_minute: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_minute,
            stop_minute,
            enabled: true,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.start_minute > 1439 || self.stop_minute > 1439 {
            return Err(format!(
                "slot {} minute out of range: start={} stop={}",
                self.id, self.start_minute, self.stop_minute
            ));
        }
        if self.start_minute >= self.stop_minute {
            return Err(format!(
                "slot {} start must precede stop: start={} stop={}",
                self.id, self.start_minute, self.stop_minute
            ));
        }
        Ok(())
    }
}

/// Explicit per-date schedule for one campaign
///
/// `days` maps "YYYY-MM-DD" (in `timezone`) to that day's slot list. Updates
/// merge new dates into the map rather than replacing it. The last-executed
/// markers provide fast duplicate suppression alongside execution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSchedule {
    pub owner: String,
    pub entity_id: String,
    pub timezone: String,
    pub days: BTreeMap<String, Vec<TimeSlot>>,
    pub last_date: Option<String>,
    pub last_slot_id: Option<String>,
    pub last_action: Option<SlotAction>,
}

impl CalendarSchedule {
    /// True when any day carries an enabled slot; such a schedule supersedes
    /// the entity's recurring schedule
    pub fn has_enabled_slot(&self) -> bool {
        self.days
            .values()
            .any(|slots| slots.iter().any(|s| s.enabled))
    }

    /// True when any scheduled date is on or after `date`. This is the
    /// coarse pre-filter that bounds per-tick evaluation cost.
    pub fn has_date_from(&self, date: &str) -> bool {
        self.days.keys().any(|d| d.as_str() >= date)
    }

    /// Merge another schedule's days into this one (shallow, per-date)
    pub fn merge_days(&mut self, incoming: BTreeMap<String, Vec<TimeSlot>>) {
        for (date, slots) in incoming {
            self.days.insert(date, slots);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for slots in self.days.values() {
            for slot in slots {
                slot.validate()?;
            }
        }
        Ok(())
    }
}

/// Which side of a calendar slot fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotAction {
    Activate,
    Stop,
}

impl SlotAction {
    pub fn desired_status(self) -> EntityStatus {
        match self {
            SlotAction::Activate => EntityStatus::Active,
            SlotAction::Stop => EntityStatus::Paused,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotAction::Activate => "activate",
            SlotAction::Stop => "stop",
        }
    }

    pub fn parse(s: &str) -> Option<SlotAction> {
        match s {
            "activate" => Some(SlotAction::Activate),
            "stop" => Some(SlotAction::Stop),
            _ => None,
        }
    }
}

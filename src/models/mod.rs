//! Shared data models spanning the engine layers.

pub mod execution;
pub mod schedule;
pub mod stoploss;

pub use execution::{EntityStatus, ExecutionRecord, ExecutionStatus};
pub use schedule::{CalendarSchedule, CyclePoint, RecurringSchedule, SlotAction, TimeSlot};
pub use stoploss::{EntityMetrics, StopLossConfig, StopLossTrigger, TriggerRule};

//! Schedule and stop-loss evaluation engines

pub mod calendar;
pub mod cycle;
pub mod orchestrator;
pub mod stoploss;

pub use calendar::CalendarSweep;
pub use cycle::{next_transition, FiredTransition, RecurringSweep, SweepStats};
pub use orchestrator::{StopLossStats, StopLossSweep};

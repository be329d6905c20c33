//! Job context for dependency injection

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::{CalendarSweep, RecurringSweep, StopLossSweep};
use crate::metrics::Metrics;

/// Context passed to job handlers via the Apalis Data<T> pattern.
///
/// Carries the three sweep evaluators plus one re-entrancy guard per sweep
/// kind: a tick that arrives while the previous pass of the same kind is
/// still running is skipped, never overlapped against shared state.
pub struct JobContext {
    pub recurring: RecurringSweep,
    pub calendar: CalendarSweep,
    pub stoploss: StopLossSweep,
    pub metrics: Option<Arc<Metrics>>,
    schedule_sweep_running: AtomicBool,
    stoploss_sweep_running: AtomicBool,
}

impl JobContext {
    pub fn new(
        recurring: RecurringSweep,
        calendar: CalendarSweep,
        stoploss: StopLossSweep,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            recurring,
            calendar,
            stoploss,
            metrics,
            schedule_sweep_running: AtomicBool::new(false),
            stoploss_sweep_running: AtomicBool::new(false),
        }
    }

    /// Claim the schedule sweep; false when a pass is already in flight
    pub fn try_begin_schedule_sweep(&self) -> bool {
        self.schedule_sweep_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn end_schedule_sweep(&self) {
        self.schedule_sweep_running.store(false, Ordering::SeqCst);
    }

    /// Claim the stop-loss sweep; false when a pass is already in flight
    pub fn try_begin_stoploss_sweep(&self) -> bool {
        self.stoploss_sweep_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn end_stoploss_sweep(&self) {
        self.stoploss_sweep_running.store(false, Ordering::SeqCst);
    }
}

//! Core application primitives (tick scheduling, worker runtime)

pub mod runtime;
pub mod scheduler;

pub use runtime::SweepRuntime;
pub use scheduler::SweepScheduler;

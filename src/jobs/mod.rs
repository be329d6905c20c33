//! Job queue system for the evaluation sweeps

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use types::{ScheduleSweepJob, StopLossSweepJob};

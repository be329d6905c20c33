//! Job types for the evaluation sweeps

use serde::{Deserialize, Serialize};

/// Job covering one recurring + calendar schedule sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSweepJob {}

/// Job covering one stop-loss batch sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopLossSweepJob {}

//! Adpulse: schedule and stop-loss automation for ad campaigns
//!
//! A background worker that pauses/activates campaigns on the external ad
//! graph from recurring daily cycles, per-date calendar slots, and
//! spend-threshold stop-loss rules.

pub mod config;
pub mod core;
pub mod db;
pub mod engine;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod time;

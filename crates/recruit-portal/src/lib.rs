//! Recruiting portal scorecards: configuration, reviewer submissions, and the
//! aggregation engine that turns them into per-field and overall scores.

pub mod config;
pub mod error;
pub mod scorecards;
pub mod telemetry;

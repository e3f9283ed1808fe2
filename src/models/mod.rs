//! Data models shared across the crate: chart data, judgement tables,
//! statistics, settings and replays.

pub mod chart;
pub mod engine;
pub mod replay;
pub mod settings;
pub mod stats;

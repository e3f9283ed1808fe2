//! Four-lane rhythm game core: `.sm` chart parsing, beat timing, note
//! scheduling and judgement, with replays and a headless autoplay driver.
//!
//! The library never installs a logger; it only emits records through `log`.

pub mod core;
pub mod logic;
pub mod models;
pub mod parsing;
pub mod shared;
pub mod state;
pub mod storage;

//! Drivers that feed inputs into a session: the autoplay bot, the headless
//! fixed-timestep loop and the replay engine.

pub mod autoplay;
pub mod game_loop;
pub mod replay_engine;

pub use autoplay::Autoplay;
pub use game_loop::{PlayOutcome, TICK_RATE, run_autoplay};
pub use replay_engine::{ReplayEngine, ReplayError};

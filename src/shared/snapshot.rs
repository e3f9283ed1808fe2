//! Render snapshots handed to the presentation layer.
//!
//! Snapshots are owned copies of session state: the excluded rendering and
//! audio layers read them without touching the engine.

use crate::models::engine::{ActionKey, ActiveNote};
use crate::models::stats::HitStats;
use crate::state::GameResult;
use crate::state::game::ScoreMarkVisual;

/// High-level render state, one variant per session state.
#[derive(Debug, Clone)]
pub enum RenderState {
    /// Chart selection, before a session starts.
    Setup(SetupSnapshot),
    /// Active gameplay.
    InGame(GameplaySnapshot),
    /// Post-game result screen.
    Result(GameResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupSnapshot {
    /// Title of the loaded track, `None` when no chart is loaded.
    pub title: Option<String>,
    /// `(meter, difficulty)` of every map, in meter order.
    pub maps: Vec<(i32, String)>,
    pub selected_map: usize,
    pub master_volume: f32,
    pub notes_scroll_speed: f32,
}

/// Snapshot of gameplay state for rendering.
#[derive(Debug, Clone)]
pub struct GameplaySnapshot {
    /// Engine time (music time plus offset) in seconds.
    pub time: f32,
    /// Seconds since the session started.
    pub elapsed: f32,
    /// Tempo at the scheduler cursor, for beat-synced effects.
    pub beats_per_second: f32,
    pub master_volume: f32,
    pub notes_scroll_speed: f32,

    /// Notes in the active window, head first.
    pub active_notes: Vec<ActiveNote>,
    /// Lanes with an open hold.
    pub held_lanes: ActionKey,
    pub score_marks: Vec<ScoreMarkVisual>,

    pub score: u64,
    pub max_score: u64,
    pub accuracy: f64,
    pub combo: u32,
    pub max_combo: u32,
    pub hit_stats: HitStats,
}

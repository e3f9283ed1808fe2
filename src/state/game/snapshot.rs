//! Snapshot creation for GameEngine.

use super::GameEngine;
use crate::shared::snapshot::GameplaySnapshot;

impl GameEngine {
    /// Creates a snapshot of the current game state for rendering.
    pub fn get_snapshot(&self) -> GameplaySnapshot {
        let score = self.judge.score();
        GameplaySnapshot {
            time: self.time,
            elapsed: self.elapsed,
            beats_per_second: self.scheduler.clock().beats_per_second(),
            master_volume: self.master_volume,
            notes_scroll_speed: self.notes_scroll_speed,
            active_notes: self.scheduler.active().iter().copied().collect(),
            held_lanes: self.judge.held(),
            score_marks: self.visuals.iter().copied().collect(),
            score: score.score,
            max_score: score.max_score,
            accuracy: score.accuracy(),
            combo: score.combo,
            max_combo: score.max_combo,
            hit_stats: score.stats.clone(),
        }
    }
}

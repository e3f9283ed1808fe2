//! Replay engine for frame-perfect replay reproduction.
//!
//! Feeds the frames and seeks of a saved `ReplayData` back into a fresh
//! `GameEngine`, built with the judgement tolerances recorded in the replay,
//! so the score and combo come out identical.

use crate::models::chart::Track;
use crate::models::engine::HitWindow;
use crate::models::replay::{REPLAY_FORMAT_VERSION, ReplayData, ReplayEvent};
use crate::shared::snapshot::GameplaySnapshot;
use crate::state::GameResult;
use crate::state::error::SessionError;
use crate::state::game::{FrameInput, GameEngine, ScoreState};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReplayError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("replay was recorded on chart {found}, this map is {expected}")]
    ChartMismatch { expected: String, found: String },

    #[error("unsupported replay format version {0}")]
    UnsupportedVersion(u8),
}

/// Engine that replays a saved replay by feeding inputs into a `GameEngine`.
pub struct ReplayEngine {
    engine: GameEngine,
    replay: ReplayData,
    /// Index of the next replay event.
    cursor: usize,
}

impl ReplayEngine {
    /// Prepares `replay` against `track.maps[map_index]`. The replay must have
    /// been recorded on that exact map.
    pub fn new(track: &Track, map_index: usize, replay: ReplayData) -> Result<Self, ReplayError> {
        if replay.version > REPLAY_FORMAT_VERSION {
            return Err(ReplayError::UnsupportedVersion(replay.version));
        }
        let hit_window =
            HitWindow::from_tolerances(replay.tolerances).map_err(SessionError::InvalidWindows)?;
        let engine = GameEngine::from_parts(track, map_index, hit_window, false)?;
        if engine.chart_hash != replay.chart_hash {
            return Err(ReplayError::ChartMismatch {
                expected: engine.chart_hash.clone(),
                found: replay.chart_hash.clone(),
            });
        }
        log::info!(
            "REPLAY: replaying {} frames on '{}' [{}]",
            replay.frame_count(),
            engine.title,
            engine.difficulty
        );
        Ok(Self {
            engine,
            replay,
            cursor: 0,
        })
    }

    /// Applies the next recorded event. Returns `false` once the replay is exhausted.
    pub fn step(&mut self) -> bool {
        let Some(event) = self.replay.events.get(self.cursor) else {
            return false;
        };
        match event {
            ReplayEvent::Frame(frame) => self.engine.update(FrameInput::from(frame)),
            ReplayEvent::Seek { music_time } => self.engine.seek(*music_time),
        }
        self.cursor += 1;
        true
    }

    /// Applies every event up to and including music time `t`.
    pub fn update_to(&mut self, t: f32) {
        while let Some(event) = self.replay.events.get(self.cursor) {
            if let ReplayEvent::Frame(frame) = event
                && frame.music_time > t
            {
                break;
            }
            self.step();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.replay.events.len()
    }

    pub fn get_snapshot(&self) -> GameplaySnapshot {
        self.engine.get_snapshot()
    }

    pub fn score(&self) -> &ScoreState {
        self.engine.score()
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Replays every remaining event and returns the final result.
    pub fn run(mut self) -> GameResult {
        while self.step() {}
        self.engine.result()
    }

    /// Replays the entire replay as fast as possible (without rendering).
    pub fn replay_fast(
        track: &Track,
        map_index: usize,
        replay: ReplayData,
    ) -> Result<GameResult, ReplayError> {
        Ok(Self::new(track, map_index, replay)?.run())
    }
}

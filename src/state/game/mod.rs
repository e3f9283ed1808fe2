//! Core gameplay engine for rhythm game mechanics.
//!
//! The `GameEngine` runs one play of one map:
//! - Note admission and eviction (`NoteScheduler` over a `BeatClock`)
//! - Tap and hold judgement, score and combo (`JudgmentEngine`)
//! - Score-mark visuals and the event stream for the presentation layer
//! - Replay recording

pub mod clock;
pub mod judge;
pub mod notes;
pub mod visuals;

mod snapshot;

pub use clock::BeatClock;
pub use judge::{GameEvent, JudgmentEngine, ScoreEvent, ScoreState};
pub use notes::NoteScheduler;
pub use visuals::{ScoreMarkVisual, ScoreMarkVisuals};

use crate::models::chart::Track;
use crate::models::engine::{ActionKey, HitWindow};
use crate::models::replay::{ReplayData, ReplayFrame};
use crate::models::settings::GameSettings;
use crate::state::GameResult;
use crate::state::error::SessionError;

/// Input of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Audio position in seconds; the track offset is added by the engine.
    pub music_time: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Lanes that went down this frame.
    pub pressed: ActionKey,
    /// Lanes currently down.
    pub down: ActionKey,
}

impl FrameInput {
    pub fn new(music_time: f32, delta: f32, pressed: ActionKey, down: ActionKey) -> Self {
        Self {
            music_time,
            delta,
            pressed,
            down,
        }
    }
}

impl From<&ReplayFrame> for FrameInput {
    fn from(frame: &ReplayFrame) -> Self {
        Self::new(frame.music_time, frame.delta, frame.pressed(), frame.down())
    }
}

/// Main gameplay engine for one map.
#[derive(Debug, Clone)]
pub struct GameEngine {
    pub title: String,
    pub difficulty: String,
    pub meter: i32,
    /// Hash of the map being played.
    pub chart_hash: String,

    /// Chart offset added to the music time.
    offset: f32,
    scheduler: NoteScheduler,
    judge: JudgmentEngine,
    visuals: ScoreMarkVisuals,
    /// Events not yet drained by the host.
    events: Vec<GameEvent>,

    /// Engine time of the last update (music time plus offset).
    time: f32,
    /// Sum of frame deltas since the session started.
    elapsed: f32,

    pub master_volume: f32,
    pub notes_scroll_speed: f32,

    /// Inputs recorded for the replay file.
    pub replay_data: ReplayData,
}

impl GameEngine {
    /// Builds an engine for `track.maps[map_index]` using the settings'
    /// judgement tolerances.
    pub fn new(track: &Track, map_index: usize, settings: &GameSettings) -> Result<Self, SessionError> {
        let hit_window = settings.hit_window().map_err(SessionError::InvalidWindows)?;
        let mut engine = Self::from_parts(track, map_index, hit_window, settings.use_assist_sound)?;
        engine.master_volume = settings.master_volume;
        engine.notes_scroll_speed = settings.notes_scroll_speed;
        Ok(engine)
    }

    /// Builds an engine with an explicit judgement table.
    pub fn from_parts(
        track: &Track,
        map_index: usize,
        hit_window: HitWindow,
        use_assist_sound: bool,
    ) -> Result<Self, SessionError> {
        let map = track.maps.get(map_index).ok_or(SessionError::MapIndexOutOfRange {
            index: map_index,
            count: track.maps.len(),
        })?;
        let clock = BeatClock::new(&track.tempo_map)?;
        let chart_hash = track.chart_hash(map);
        let tolerances = hit_window.tolerances();
        let defaults = GameSettings::default();

        log::info!(
            "ENGINE: starting '{}' [{} {}] ({} rows, hash {})",
            track.title,
            map.meter,
            map.difficulty,
            map.notes.len(),
            chart_hash
        );

        Ok(Self {
            title: track.title.clone(),
            difficulty: map.difficulty.clone(),
            meter: map.meter,
            replay_data: ReplayData::new(chart_hash.clone(), tolerances),
            chart_hash,
            offset: track.offset,
            scheduler: NoteScheduler::new(map.notes.clone(), clock),
            judge: JudgmentEngine::new(hit_window, use_assist_sound),
            visuals: ScoreMarkVisuals::new(),
            events: Vec::new(),
            time: 0.0,
            elapsed: 0.0,
            master_volume: defaults.master_volume,
            notes_scroll_speed: defaults.notes_scroll_speed,
        })
    }

    /// Advances the engine by one frame: admit, judge, then evict.
    pub fn update(&mut self, input: FrameInput) {
        self.replay_data.push_frame(ReplayFrame::new(
            input.music_time,
            input.delta,
            input.pressed,
            input.down,
        ));

        self.elapsed += input.delta.max(0.0);
        self.time = input.music_time + self.offset;
        let down = input.down | input.pressed;

        self.scheduler.admit(self.time);
        self.judge
            .update(self.scheduler.active_mut(), self.time, input.pressed, down);

        for event in self.judge.take_events() {
            if let GameEvent::Score(score) = &event {
                self.visuals
                    .spawn(self.elapsed, score.judgement, score.lane_count);
            }
            self.events.push(event);
        }

        self.scheduler.evict(self.time);
        self.visuals.expire(self.elapsed);
    }

    /// Jumps to `music_time`. The active window and open holds are dropped;
    /// score and combo are kept.
    pub fn seek(&mut self, music_time: f32) {
        self.replay_data.push_seek(music_time);
        self.time = music_time + self.offset;
        self.scheduler.reset_to_time(self.time);
        self.judge.release_all();
        log::info!(
            "ENGINE: seek to {:.3}s (next note #{})",
            self.time,
            self.scheduler.next_index()
        );
    }

    /// Every note has been admitted and has left the active window.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> &ScoreState {
        self.judge.score()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn held_lanes(&self) -> ActionKey {
        self.judge.held()
    }

    pub fn scheduler(&self) -> &NoteScheduler {
        &self.scheduler
    }

    pub fn visuals(&self) -> &ScoreMarkVisuals {
        &self.visuals
    }

    /// Final numbers of the play so far.
    pub fn result(&self) -> GameResult {
        let score = self.judge.score();
        GameResult {
            title: self.title.clone(),
            difficulty: self.difficulty.clone(),
            meter: self.meter,
            chart_hash: self.chart_hash.clone(),
            score: score.score,
            max_score: score.max_score,
            accuracy: score.accuracy(),
            max_combo: score.max_combo,
            stats: score.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::Judgement;
    use crate::parsing::parse_str;

    const CHART: &str = "#TITLE:Engine;\n#OFFSET:0;\n#BPMS:0.0=120.0;\n#NOTES:\n     dance-single:\n     :\n     Easy:\n     1:\n     0,0,0,0,0:\n1000\n0000\n0010\n0001\n;\n";

    fn engine() -> GameEngine {
        let track = parse_str(CHART).unwrap();
        GameEngine::new(&track, 0, &GameSettings::default()).unwrap()
    }

    fn step(engine: &mut GameEngine, t: f32, pressed: ActionKey) {
        engine.update(FrameInput::new(t, 0.01, pressed, pressed));
    }

    #[test]
    fn rejects_bad_setup() {
        let mut track = parse_str(CHART).unwrap();
        assert!(matches!(
            GameEngine::new(&track, 3, &GameSettings::default()),
            Err(SessionError::MapIndexOutOfRange { index: 3, count: 1 })
        ));
        track.tempo_map.clear();
        assert!(matches!(
            GameEngine::new(&track, 0, &GameSettings::default()),
            Err(SessionError::EmptyTempoMap)
        ));
    }

    #[test]
    fn plays_scenario_and_finishes() {
        let mut e = engine();
        step(&mut e, 0.0, ActionKey::LEFT);
        step(&mut e, 1.0, ActionKey::UP);
        step(&mut e, 1.5, ActionKey::RIGHT);
        assert_eq!(e.score().score, 300);
        assert_eq!(e.score().combo, 3);
        assert_eq!(e.visuals().len(), 3);
        assert!(!e.is_finished());

        step(&mut e, 3.0, ActionKey::empty());
        assert!(e.is_finished());
        let result = e.result();
        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.max_combo, 3);
        assert_eq!(result.stats.perfect, 3);
    }

    #[test]
    fn missed_notes_are_scored_before_eviction() {
        let mut e = engine();
        step(&mut e, 0.0, ActionKey::empty());
        // A single late frame skips straight past every note.
        step(&mut e, 10.0, ActionKey::empty());
        assert!(e.is_finished());
        assert_eq!(e.score().stats.miss, 3);
        assert_eq!(e.score().score, 0);
        assert_eq!(e.result().accuracy, 0.0);
    }

    #[test]
    fn events_are_drained_once() {
        let mut e = engine();
        step(&mut e, 0.0, ActionKey::LEFT);
        let events = e.drain_events();
        assert_eq!(events.len(), 1);
        match events[0] {
            GameEvent::Score(s) => {
                assert_eq!(s.judgement, Judgement::Perfect);
                assert_eq!(s.label, "Perfect");
                assert_eq!(s.lane_count, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn offset_shifts_engine_time() {
        let mut track = parse_str(CHART).unwrap();
        track.offset = 0.5;
        let mut e = GameEngine::new(&track, 0, &GameSettings::default()).unwrap();
        // Music time 0.5 is engine time 1.0, the arrival of the second note.
        step(&mut e, -0.5, ActionKey::LEFT);
        step(&mut e, 0.5, ActionKey::UP);
        assert_eq!(e.score().stats.perfect, 2);
    }

    #[test]
    fn seek_skips_earlier_notes() {
        let mut e = engine();
        e.seek(0.9);
        step(&mut e, 1.0, ActionKey::UP);
        step(&mut e, 1.5, ActionKey::RIGHT);
        step(&mut e, 5.0, ActionKey::empty());
        assert_eq!(e.score().stats.perfect, 2);
        assert_eq!(e.score().stats.miss, 0);
        assert_eq!(e.replay_data.frame_count(), 3);
    }

    #[test]
    fn records_every_frame() {
        let mut e = engine();
        step(&mut e, 0.0, ActionKey::LEFT);
        step(&mut e, 0.01, ActionKey::empty());
        assert_eq!(e.replay_data.frame_count(), 2);
        assert_eq!(e.replay_data.chart_hash, e.chart_hash);
    }
}

//! Session state management.
//!
//! A session moves through a closed set of states:
//! - `Setup` - chart loaded (or not), map selected
//! - `Playing` - a `GameEngine` is running
//! - `Ended` - the result of the last play is available
//!
//! Every transition is an explicit method on [`Session`].

pub mod error;
pub mod game;

pub use error::SessionError;
pub use game::{FrameInput, GameEngine, GameEvent};

use crate::models::chart::Track;
use crate::models::replay::ReplayData;
use crate::models::settings::GameSettings;
use crate::models::stats::HitStats;
use crate::parsing::load_track;
use crate::shared::snapshot::{RenderState, SetupSnapshot};
use serde::Serialize;

/// Outcome of one play.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameResult {
    pub title: String,
    pub difficulty: String,
    pub meter: i32,
    pub chart_hash: String,
    pub score: u64,
    pub max_score: u64,
    /// `score / max_score`, 1.0 when nothing was scored.
    pub accuracy: f64,
    pub max_combo: u32,
    pub stats: HitStats,
}

#[derive(Debug)]
pub enum SessionState {
    Setup {
        /// `None` until a chart has been loaded.
        track: Option<Track>,
        selected_map: usize,
    },
    Playing {
        track: Track,
        selected_map: usize,
        engine: Box<GameEngine>,
    },
    Ended {
        track: Track,
        selected_map: usize,
        result: GameResult,
        /// Inputs of the finished play.
        replay: ReplayData,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Setup {
            track: None,
            selected_map: 0,
        }
    }
}

/// Owns the settings and the current state of one player's session.
#[derive(Debug, Default)]
pub struct Session {
    settings: GameSettings,
    state: SessionState,
}

impl Session {
    /// Starts in setup, with `settings.default_track` loaded when it is set
    /// and parses.
    pub fn new(settings: GameSettings) -> Self {
        let track = settings.default_track.as_deref().and_then(|path| {
            match load_track(path) {
                Ok(track) => {
                    log::info!("SESSION: default track '{}' from {:?}", track.title, path);
                    Some(track)
                }
                Err(e) => {
                    log::warn!("SESSION: cannot load default track {:?}: {}", path, e);
                    None
                }
            }
        });
        Self {
            settings,
            state: SessionState::Setup {
                track,
                selected_map: 0,
            },
        }
    }

    /// Loads a chart and returns to setup. A running play is abandoned.
    pub fn load_track(&mut self, track: Track) {
        if self.is_playing() {
            log::warn!("SESSION: abandoning running play to load '{}'", track.title);
        }
        log::info!("SESSION: loaded '{}' ({} maps)", track.title, track.maps.len());
        self.state = SessionState::Setup {
            track: Some(track),
            selected_map: 0,
        };
    }

    /// Selects the map to play, in setup or after a play.
    pub fn select_map(&mut self, index: usize) -> Result<(), SessionError> {
        match &mut self.state {
            SessionState::Setup { track: None, .. } => Err(SessionError::NoChartLoaded),
            SessionState::Setup {
                track: Some(track),
                selected_map,
            }
            | SessionState::Ended {
                track,
                selected_map,
                ..
            } => {
                if index >= track.maps.len() {
                    return Err(SessionError::MapIndexOutOfRange {
                        index,
                        count: track.maps.len(),
                    });
                }
                *selected_map = index;
                Ok(())
            }
            SessionState::Playing { .. } => Err(SessionError::AlreadyPlaying),
        }
    }

    /// Starts a play of the selected map.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let (track, selected_map) = match std::mem::take(&mut self.state) {
            SessionState::Setup {
                track: Some(track),
                selected_map,
            }
            | SessionState::Ended {
                track,
                selected_map,
                ..
            } => (track, selected_map),
            SessionState::Setup { track: None, .. } => return Err(SessionError::NoChartLoaded),
            playing @ SessionState::Playing { .. } => {
                self.state = playing;
                return Err(SessionError::AlreadyPlaying);
            }
        };

        match GameEngine::new(&track, selected_map, &self.settings) {
            Ok(engine) => {
                log::info!("SESSION: playing map #{} of '{}'", selected_map, track.title);
                self.state = SessionState::Playing {
                    track,
                    selected_map,
                    engine: Box::new(engine),
                };
                Ok(())
            }
            Err(e) => {
                log::error!("SESSION: cannot start '{}': {}", track.title, e);
                self.state = SessionState::Setup {
                    track: Some(track),
                    selected_map,
                };
                Err(e)
            }
        }
    }

    /// Feeds one frame to the running play and returns its events.
    ///
    /// Ends the play once every note has been judged and dropped.
    pub fn update(&mut self, input: FrameInput) -> Result<Vec<GameEvent>, SessionError> {
        let SessionState::Playing { engine, .. } = &mut self.state else {
            return Err(SessionError::NotPlaying);
        };
        engine.update(input);
        let events = engine.drain_events();
        if engine.is_finished() {
            self.finish()?;
        }
        Ok(events)
    }

    /// Jumps the running play to `music_time`.
    pub fn seek(&mut self, music_time: f32) -> Result<(), SessionError> {
        let SessionState::Playing { engine, .. } = &mut self.state else {
            return Err(SessionError::NotPlaying);
        };
        engine.seek(music_time);
        Ok(())
    }

    /// Ends the running play, e.g. when the audio stream runs out.
    pub fn finish(&mut self) -> Result<GameResult, SessionError> {
        match std::mem::take(&mut self.state) {
            SessionState::Playing {
                track,
                selected_map,
                engine,
            } => {
                let engine = *engine;
                let result = engine.result();
                log::info!(
                    "SESSION: finished '{}' with {} ({:.2}%), max combo {}",
                    result.title,
                    result.score,
                    result.accuracy * 100.0,
                    result.max_combo
                );
                self.state = SessionState::Ended {
                    track,
                    selected_map,
                    result: result.clone(),
                    replay: engine.replay_data,
                };
                Ok(result)
            }
            other => {
                self.state = other;
                Err(SessionError::NotPlaying)
            }
        }
    }

    /// Leaves a play or its result screen, keeping the chart and selection.
    pub fn back_to_setup(&mut self) {
        self.state = match std::mem::take(&mut self.state) {
            SessionState::Playing {
                track,
                selected_map,
                ..
            }
            | SessionState::Ended {
                track,
                selected_map,
                ..
            } => SessionState::Setup {
                track: Some(track),
                selected_map,
            },
            setup => setup,
        };
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, SessionState::Playing { .. })
    }

    pub fn has_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended { .. })
    }

    pub fn track(&self) -> Option<&Track> {
        match &self.state {
            SessionState::Setup { track, .. } => track.as_ref(),
            SessionState::Playing { track, .. } | SessionState::Ended { track, .. } => Some(track),
        }
    }

    pub fn selected_map(&self) -> usize {
        match &self.state {
            SessionState::Setup { selected_map, .. }
            | SessionState::Playing { selected_map, .. }
            | SessionState::Ended { selected_map, .. } => *selected_map,
        }
    }

    pub fn engine(&self) -> Option<&GameEngine> {
        match &self.state {
            SessionState::Playing { engine, .. } => Some(engine.as_ref()),
            _ => None,
        }
    }

    /// Inputs recorded so far, or those of the finished play.
    pub fn replay(&self) -> Option<&ReplayData> {
        match &self.state {
            SessionState::Playing { engine, .. } => Some(&engine.replay_data),
            SessionState::Ended { replay, .. } => Some(replay),
            SessionState::Setup { .. } => None,
        }
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.state {
            SessionState::Ended { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Settings changes apply from the next play.
    pub fn settings_mut(&mut self) -> &mut GameSettings {
        &mut self.settings
    }

    pub fn create_snapshot(&self) -> RenderState {
        match &self.state {
            SessionState::Setup {
                track,
                selected_map,
            } => RenderState::Setup(SetupSnapshot {
                title: track.as_ref().map(|t| t.title.clone()),
                maps: track
                    .iter()
                    .flat_map(|t| t.maps.iter().map(|m| (m.meter, m.difficulty.clone())))
                    .collect(),
                selected_map: *selected_map,
                master_volume: self.settings.master_volume,
                notes_scroll_speed: self.settings.notes_scroll_speed,
            }),
            SessionState::Playing { engine, .. } => RenderState::InGame(engine.get_snapshot()),
            SessionState::Ended { result, .. } => RenderState::Result(result.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::ActionKey;
    use crate::parsing::parse_str;

    const CHART: &str = "#TITLE:Session;\n#BPMS:0=120;\n\
        #NOTES:\n a:\n b:\n   Hard:\n   5:\n c:\n1000\n0100\n;\n\
        #NOTES:\n a:\n b:\n   Easy:\n   1:\n c:\n0001\n;\n";

    fn loaded() -> Session {
        let mut session = Session::new(GameSettings::default());
        session.load_track(parse_str(CHART).unwrap());
        session
    }

    #[test]
    fn cannot_start_without_chart() {
        let mut session = Session::default();
        assert_eq!(session.start(), Err(SessionError::NoChartLoaded));
        assert_eq!(session.select_map(0), Err(SessionError::NoChartLoaded));
        assert!(matches!(session.state(), SessionState::Setup { track: None, .. }));
    }

    #[test]
    fn default_track_is_loaded_at_creation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sm");
        std::fs::write(&path, CHART).unwrap();

        let settings = GameSettings {
            default_track: Some(path.clone()),
            ..GameSettings::default()
        };
        let session = Session::new(settings);
        let track = session.track().unwrap();
        assert_eq!(track.title, "Session");
        assert_eq!(track.source_path.as_deref(), Some(path.as_path()));

        let settings = GameSettings {
            default_track: Some(dir.path().join("missing.sm")),
            ..GameSettings::default()
        };
        let mut session = Session::new(settings);
        assert!(session.track().is_none());
        assert_eq!(session.start(), Err(SessionError::NoChartLoaded));
    }

    #[test]
    fn update_requires_a_running_play() {
        let mut session = loaded();
        assert_eq!(
            session.update(FrameInput::default()),
            Err(SessionError::NotPlaying)
        );
        assert_eq!(session.finish(), Err(SessionError::NotPlaying));
        assert_eq!(session.seek(1.0), Err(SessionError::NotPlaying));
    }

    #[test]
    fn select_map_is_bounds_checked() {
        let mut session = loaded();
        assert_eq!(
            session.select_map(2),
            Err(SessionError::MapIndexOutOfRange { index: 2, count: 2 })
        );
        assert_eq!(session.select_map(1), Ok(()));
        assert_eq!(session.selected_map(), 1);
    }

    #[test]
    fn full_cycle() {
        let mut session = loaded();
        session.start().unwrap();
        assert!(session.is_playing());
        assert_eq!(session.start(), Err(SessionError::AlreadyPlaying));
        assert_eq!(session.select_map(1), Err(SessionError::AlreadyPlaying));

        // Easy map (meter 1) sorts first: a single right tap at 0s.
        let events = session
            .update(FrameInput::new(0.0, 0.01, ActionKey::RIGHT, ActionKey::RIGHT))
            .unwrap();
        assert_eq!(events.len(), 1);
        session
            .update(FrameInput::new(2.0, 0.01, ActionKey::empty(), ActionKey::empty()))
            .unwrap();
        assert!(session.has_ended());
        let result = session.result().unwrap();
        assert_eq!(result.difficulty, "Easy");
        assert_eq!(result.score, 100);
        assert_eq!(session.replay().map(|r| r.frame_count()), Some(2));
        assert!(matches!(session.create_snapshot(), RenderState::Result(_)));

        session.back_to_setup();
        assert!(matches!(
            session.state(),
            SessionState::Setup { track: Some(_), .. }
        ));
    }

    #[test]
    fn invalid_windows_keep_setup() {
        let mut session = loaded();
        session.settings_mut().judgement = Some(crate::models::engine::WindowTolerances {
            meh: 0.0,
            ..Default::default()
        });
        assert!(matches!(session.start(), Err(SessionError::InvalidWindows(_))));
        assert!(matches!(session.state(), SessionState::Setup { track: Some(_), .. }));
    }

    #[test]
    fn finish_early_ends_play() {
        let mut session = loaded();
        session.start().unwrap();
        let result = session.finish().unwrap();
        assert_eq!(result.accuracy, 1.0);
        assert!(session.has_ended());
        // Restarting from the result screen replays the same map.
        session.start().unwrap();
        assert!(session.is_playing());
    }
}

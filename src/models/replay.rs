//! Serializable replay structures.
//!
//! A replay is the exact per-frame input sequence of a session. Feeding it back
//! into a fresh engine reproduces the same score and combo.

use crate::models::engine::{ActionKey, WindowTolerances};
use serde::{Deserialize, Serialize};

/// Current replay format version for compatibility.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// Input of one frame. Lane masks are stored as raw bits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Audio position in seconds, before the chart offset is applied.
    pub music_time: f32,
    /// Frame delta in seconds.
    pub delta: f32,
    pub pressed: u8,
    pub down: u8,
}

impl ReplayFrame {
    pub fn new(music_time: f32, delta: f32, pressed: ActionKey, down: ActionKey) -> Self {
        Self {
            music_time,
            delta,
            pressed: pressed.bits(),
            down: down.bits(),
        }
    }

    #[inline]
    pub fn pressed(&self) -> ActionKey {
        ActionKey::from_bits_truncate(self.pressed)
    }

    #[inline]
    pub fn down(&self) -> ActionKey {
        ActionKey::from_bits_truncate(self.down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReplayEvent {
    Frame(ReplayFrame),
    /// The session jumped to another audio position.
    Seek { music_time: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    /// Format version for future compatibility.
    pub version: u8,
    /// Hash of the map that was played.
    pub chart_hash: String,
    /// Judgement tolerances in effect during the play.
    pub tolerances: WindowTolerances,
    /// Every frame and seek in chronological order.
    pub events: Vec<ReplayEvent>,
}

impl ReplayData {
    pub fn new(chart_hash: impl Into<String>, tolerances: WindowTolerances) -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            chart_hash: chart_hash.into(),
            tolerances,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn push_frame(&mut self, frame: ReplayFrame) {
        self.events.push(ReplayEvent::Frame(frame));
    }

    #[inline]
    pub fn push_seek(&mut self, music_time: f32) {
        self.events.push(ReplayEvent::Seek { music_time });
    }

    pub fn frame_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReplayEvent::Frame(_)))
            .count()
    }

    /// Audio position of the last recorded frame.
    pub fn last_time(&self) -> Option<f32> {
        self.events.iter().rev().find_map(|e| match e {
            ReplayEvent::Frame(f) => Some(f.music_time),
            ReplayEvent::Seek { .. } => None,
        })
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

use thiserror::Error;

/// Failure to start or drive a play session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("tempo map is empty")]
    EmptyTempoMap,

    #[error("tempo entry {index} has a non-positive bpm ({bpm})")]
    NonPositiveBpm { index: usize, bpm: f32 },

    #[error("no chart loaded")]
    NoChartLoaded,

    #[error("map index {index} out of range ({count} maps)")]
    MapIndexOutOfRange { index: usize, count: usize },

    #[error("invalid judgement windows: {0}")]
    InvalidWindows(String),

    #[error("no session is playing")]
    NotPlaying,

    #[error("a session is already playing")]
    AlreadyPlaying,
}

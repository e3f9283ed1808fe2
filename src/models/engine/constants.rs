//! Fixed timing constants shared by the scheduler and the judge.

/// How far ahead of the clock a note is admitted into the active window (seconds).
pub const FORWARD_LOOKUP_SECONDS: f32 = 3.0;

/// How far behind the clock the head of the active window is dropped (seconds).
pub const DROP_SECONDS: f32 = 1.0;

/// Quarter notes per measure.
pub const BEATS_PER_MEASURE: f32 = 4.0;

/// Row subdivisions used to classify notes, coarsest first.
pub const BEAT_PARTITIONS: [u32; 4] = [4, 8, 12, 16];

/// Number of playable lanes.
pub const NUM_LANES: usize = 4;

/// Lifetime of a score-mark visual (seconds).
pub const SCORE_MARK_DURATION: f32 = 1.0;

/// Initial capacity of the engine ring queues.
pub const ACTIVE_WINDOW_CAPACITY: usize = 8;

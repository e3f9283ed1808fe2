//! Beat-to-time conversion, and back, over a piecewise tempo map.
//!
//! Time is integrated incrementally: each step converts the beat delta with the
//! tempo in effect at the previous step, then moves the tempo cursor past every
//! entry whose beat has been reached. Beats must therefore be fed in
//! non-decreasing order; use [`BeatClock::reset`] before going backwards.

use crate::models::chart::TempoPoint;
use crate::models::engine::{BEATS_PER_MEASURE, Note};
use crate::state::error::SessionError;

#[derive(Debug, Clone)]
pub struct BeatClock {
    tempo_map: Vec<TempoPoint>,
    tempo_index: usize,
    beats_per_second: f32,
    current_beat: f32,
    current_time: f32,
}

impl BeatClock {
    /// Rejects an empty tempo map or any non-positive bpm.
    pub fn new(tempo_map: &[TempoPoint]) -> Result<Self, SessionError> {
        let first = tempo_map.first().ok_or(SessionError::EmptyTempoMap)?;
        if let Some((index, point)) = tempo_map
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.bpm.is_finite() && p.bpm > 0.0))
        {
            return Err(SessionError::NonPositiveBpm {
                index,
                bpm: point.bpm,
            });
        }
        Ok(Self {
            beats_per_second: first.beats_per_second(),
            tempo_map: tempo_map.to_vec(),
            tempo_index: 0,
            current_beat: 0.0,
            current_time: 0.0,
        })
    }

    /// Absolute beat of a chart row: `measure * 4 + local / length * 4`.
    pub fn note_beat(note: &Note, local_index: u32) -> f32 {
        let measure_beat = note.measure as f32 * BEATS_PER_MEASURE;
        if note.measure_length == 0 {
            return measure_beat;
        }
        measure_beat + local_index as f32 / note.measure_length as f32 * BEATS_PER_MEASURE
    }

    /// Time `beat` would be reached at, without moving the cursor.
    #[inline]
    pub fn time_at(&self, beat: f32) -> f32 {
        self.current_time + (beat - self.current_beat) / self.beats_per_second
    }

    /// Beat reached at `time` under the tempo at the cursor, without moving it.
    #[inline]
    pub fn beat_at(&self, time: f32) -> f32 {
        self.current_beat + (time - self.current_time) * self.beats_per_second
    }

    /// Moves the cursor to `beat` and returns its time.
    pub fn advance_to(&mut self, beat: f32) -> f32 {
        let time = self.time_at(beat);
        self.current_time = time;
        self.current_beat = beat;
        while self.tempo_index + 1 < self.tempo_map.len()
            && self.tempo_map[self.tempo_index + 1].beat <= self.current_beat
        {
            self.tempo_index += 1;
            self.beats_per_second = self.tempo_map[self.tempo_index].beats_per_second();
        }
        time
    }

    /// Back to beat 0, time 0, first tempo entry.
    pub fn reset(&mut self) {
        self.tempo_index = 0;
        self.beats_per_second = self.tempo_map[0].beats_per_second();
        self.current_beat = 0.0;
        self.current_time = 0.0;
    }

    pub fn beats_per_second(&self) -> f32 {
        self.beats_per_second
    }

    pub fn current_beat(&self) -> f32 {
        self.current_beat
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn tempo_index(&self) -> usize {
        self.tempo_index
    }
}

/// Walks a note sequence and yields each note's index, row index inside its
/// measure and absolute beat.
pub fn note_positions(notes: &[Note]) -> impl Iterator<Item = (usize, u32, f32)> + '_ {
    let mut measure = 0u32;
    let mut measure_start = 0usize;
    notes.iter().enumerate().map(move |(index, note)| {
        if note.measure > measure || index == 0 {
            measure = note.measure;
            measure_start = index;
        }
        let local = (index - measure_start) as u32;
        (index, local, BeatClock::note_beat(note, local))
    })
}

/// Arrival time of every note, integrated in a single forward pass.
pub fn arrival_times(tempo_map: &[TempoPoint], notes: &[Note]) -> Result<Vec<f32>, SessionError> {
    let mut clock = BeatClock::new(tempo_map)?;
    Ok(note_positions(notes)
        .map(|(_, _, beat)| clock.advance_to(beat))
        .collect())
}

//! Chart notes and their in-play working state.

use super::action_key::ActionKey;
use super::constants::BEAT_PARTITIONS;

/// One parsed chart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Note {
    /// 0-based measure index.
    pub measure: u32,
    /// Number of rows in this note's measure.
    pub measure_length: u32,
    pub tap: ActionKey,
    pub hold_start: ActionKey,
    pub hold_end: ActionKey,
}

impl Note {
    /// Every lane this row asks something of.
    #[inline]
    pub fn actions(&self) -> ActionKey {
        self.tap | self.hold_start | self.hold_end
    }

    /// Returns true if the row carries no tap, hold start or hold end.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions().is_empty()
    }
}

/// A note admitted into the active window.
///
/// Created by the scheduler, mutated in place by the judge and destroyed when
/// the scheduler pops it from the head of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveNote {
    pub note: Note,
    /// Index of the note in its map.
    pub index: usize,
    /// Row index inside the measure.
    pub local_index: u32,
    /// Absolute track time at which the note should be hit (seconds).
    pub arrival_time: f32,
    /// Row subdivision class (4, 8, 12 or 16).
    pub beat_partition: u32,
    /// Lanes already resolved for this note.
    pub tap_hit: ActionKey,
    /// The arrival time has elapsed.
    pub passed_target: bool,
    /// The outer window has receded past this note; scoring is final.
    pub passed_judgement: bool,
}

impl ActiveNote {
    pub fn new(note: Note, index: usize, local_index: u32, arrival_time: f32) -> Self {
        Self {
            note,
            index,
            local_index,
            arrival_time,
            beat_partition: beat_partition(local_index, note.measure_length),
            tap_hit: ActionKey::empty(),
            passed_target: false,
            passed_judgement: false,
        }
    }

    /// Lanes of this note that are still waiting for the player.
    pub fn unresolved(&self) -> ActionKey {
        self.note.actions() & !self.tap_hit
    }
}

/// Coarsest subdivision in [`BEAT_PARTITIONS`] that `local_index` falls on.
///
/// Rows that align with none of them are classed with the finest subdivision.
pub fn beat_partition(local_index: u32, measure_length: u32) -> u32 {
    let finest = BEAT_PARTITIONS[BEAT_PARTITIONS.len() - 1];
    if measure_length == 0 {
        return finest;
    }
    BEAT_PARTITIONS
        .iter()
        .copied()
        .find(|&partition| {
            measure_length % partition == 0 && local_index % (measure_length / partition) == 0
        })
        .unwrap_or(finest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_rows_in_four_row_measure() {
        for row in 0..4 {
            assert_eq!(beat_partition(row, 4), 4);
        }
    }

    #[test]
    fn eighth_and_sixteenth_rows() {
        assert_eq!(beat_partition(0, 16), 4);
        assert_eq!(beat_partition(2, 16), 8);
        assert_eq!(beat_partition(1, 16), 16);
        assert_eq!(beat_partition(1, 8), 8);
    }

    #[test]
    fn triplets_use_twelfths() {
        assert_eq!(beat_partition(1, 12), 12);
        assert_eq!(beat_partition(3, 12), 4);
    }

    #[test]
    fn unaligned_rows_default_to_finest() {
        assert_eq!(beat_partition(1, 3), 16);
        assert_eq!(beat_partition(5, 24), 16);
    }

    #[test]
    fn unresolved_excludes_hit_lanes() {
        let note = Note {
            tap: ActionKey::LEFT | ActionKey::UP,
            hold_end: ActionKey::RIGHT,
            ..Note::default()
        };
        let mut active = ActiveNote::new(note, 0, 0, 1.0);
        active.tap_hit = ActionKey::UP;
        assert_eq!(active.unresolved(), ActionKey::LEFT | ActionKey::RIGHT);
    }
}

//! Note scheduling: admission into the active window and eviction from it.

use super::clock::BeatClock;
use crate::models::engine::{
    ACTIVE_WINDOW_CAPACITY, ActiveNote, DROP_SECONDS, FORWARD_LOOKUP_SECONDS, Note,
};
use crate::shared::ring_queue::RingQueue;

/// Rows this many beats before a seek target still count as on it.
const SEEK_BEAT_EPSILON: f32 = 1e-4;

/// Position of the next unadmitted note, computed without moving the cursor.
#[derive(Debug, Clone, Copy)]
struct Pending {
    measure: u32,
    measure_start: usize,
    local_index: u32,
    beat: f32,
}

/// Forward-only cursor over a map's notes.
///
/// Each admission integrates the tempo map up to the admitted note, so notes
/// must be admitted in order. Any backward jump goes through one of the reset
/// methods.
#[derive(Debug, Clone)]
pub struct NoteScheduler {
    notes: Vec<Note>,
    clock: BeatClock,
    active: RingQueue<ActiveNote>,

    /// Index of the next note to admit.
    next_index: usize,
    /// Measure of the last admitted note.
    current_measure: u32,
    /// Index of the first note of `current_measure`.
    measure_start: usize,
}

impl NoteScheduler {
    pub fn new(notes: Vec<Note>, clock: BeatClock) -> Self {
        Self {
            notes,
            clock,
            active: RingQueue::with_capacity(ACTIVE_WINDOW_CAPACITY),
            next_index: 0,
            current_measure: 0,
            measure_start: 0,
        }
    }

    fn pending(&self) -> Option<Pending> {
        let note = self.notes.get(self.next_index)?;
        let (measure, measure_start) = if note.measure > self.current_measure {
            (note.measure, self.next_index)
        } else {
            (self.current_measure, self.measure_start)
        };
        let local_index = (self.next_index - measure_start) as u32;
        Some(Pending {
            measure,
            measure_start,
            local_index,
            beat: BeatClock::note_beat(note, local_index),
        })
    }

    /// Moves the cursor past the next note. Only notes carrying an action are
    /// enqueued, and only when `enqueue` is set.
    fn commit(&mut self, pending: Pending, enqueue: bool) {
        let arrival_time = self.clock.advance_to(pending.beat);
        self.current_measure = pending.measure;
        self.measure_start = pending.measure_start;

        let note = self.notes[self.next_index];
        if enqueue && !note.is_empty() {
            self.active.enqueue(ActiveNote::new(
                note,
                self.next_index,
                pending.local_index,
                arrival_time,
            ));
        }
        self.next_index += 1;
    }

    /// Admits every note whose arrival is within the lookahead of `now`.
    ///
    /// Returns the number of notes the cursor moved past.
    pub fn admit(&mut self, now: f32) -> usize {
        let mut admitted = 0;
        while let Some(pending) = self.pending() {
            if self.clock.time_at(pending.beat) - FORWARD_LOOKUP_SECONDS > now {
                break;
            }
            self.commit(pending, true);
            admitted += 1;
        }
        admitted
    }

    /// Drops head notes whose arrival is more than the drop window behind `now`.
    pub fn evict(&mut self, now: f32) -> usize {
        let mut evicted = 0;
        while let Some(head) = self.active.peek() {
            if head.arrival_time - now >= -DROP_SECONDS {
                break;
            }
            if !head.passed_judgement {
                log::debug!(
                    "ENGINE: evicting note {} before it was finalized (arrival {:.3}s, now {:.3}s)",
                    head.index,
                    head.arrival_time,
                    now
                );
            }
            self.active.dequeue();
            evicted += 1;
        }
        evicted
    }

    /// Rewinds to the first note with an empty active window.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.active.clear();
        self.next_index = 0;
        self.current_measure = 0;
        self.measure_start = 0;
    }

    /// Rebuilds the cursor so that the next admitted note is the first one at
    /// or after `beat`.
    pub fn reset_to_beat(&mut self, beat: f32) {
        self.reset();
        while let Some(pending) = self.pending() {
            if pending.beat >= beat {
                break;
            }
            self.commit(pending, false);
        }
    }

    /// Rebuilds the cursor so that the next admitted note is the first one
    /// arriving at or after `time`.
    ///
    /// The target beat follows the clock as rows are committed.
    pub fn reset_to_time(&mut self, time: f32) {
        self.reset();
        while let Some(pending) = self.pending() {
            if pending.beat + SEEK_BEAT_EPSILON >= self.clock.beat_at(time) {
                break;
            }
            self.commit(pending, false);
        }
    }

    pub fn active(&self) -> &RingQueue<ActiveNote> {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut RingQueue<ActiveNote> {
        &mut self.active
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Every note has been admitted.
    pub fn is_exhausted(&self) -> bool {
        self.next_index >= self.notes.len()
    }

    /// Every note has been admitted and evicted.
    pub fn is_finished(&self) -> bool {
        self.is_exhausted() && self.active.is_empty()
    }
}

//! Input bot that plays a chart perfectly.

use crate::models::chart::Track;
use crate::models::engine::{ActionKey, Lane, Note, NUM_LANES};
use crate::state::error::SessionError;
use crate::state::game::clock::arrival_times;

/// A hold the bot keeps down, in music time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HoldSpan {
    lane: Lane,
    start: f32,
    end: f32,
}

/// Produces the ideal `(pressed, down)` masks for frames of constant length.
///
/// A lane is pressed on the frame whose centre is closest to the note's
/// arrival, and hold lanes stay down until the frame in which the hold end
/// arrives.
#[derive(Debug, Clone, Default)]
pub struct Autoplay {
    /// Music time and lanes of every row with a tap or hold start.
    presses: Vec<(f32, ActionKey)>,
    holds: Vec<HoldSpan>,
    last_arrival: f32,
}

impl Autoplay {
    /// Bot for `track.maps[map_index]`.
    pub fn new(track: &Track, map_index: usize) -> Result<Self, SessionError> {
        let map = track.maps.get(map_index).ok_or(SessionError::MapIndexOutOfRange {
            index: map_index,
            count: track.maps.len(),
        })?;
        let arrivals = arrival_times(&track.tempo_map, &map.notes)?;
        Ok(Self::from_arrivals(&map.notes, &arrivals, track.offset))
    }

    /// Builds the bot from engine-time arrivals; `offset` converts them back
    /// to music time.
    pub fn from_arrivals(notes: &[Note], arrivals: &[f32], offset: f32) -> Self {
        let mut presses = Vec::new();
        let mut holds = Vec::new();
        let mut open: [Option<f32>; NUM_LANES] = [None; NUM_LANES];
        let mut last_arrival = 0.0f32;

        for (note, arrival) in notes.iter().zip(arrivals) {
            let time = arrival - offset;
            if !note.is_empty() {
                last_arrival = last_arrival.max(time);
            }

            let press = note.tap | note.hold_start;
            if !press.is_empty() {
                presses.push((time, press));
            }
            for lane in note.hold_end.lanes() {
                if let Some(start) = open[lane.index()].take() {
                    holds.push(HoldSpan {
                        lane,
                        start,
                        end: time,
                    });
                }
            }
            for lane in note.hold_start.lanes() {
                open[lane.index()] = Some(time);
            }
        }

        // Holds without an end stay down for the rest of the chart.
        for lane in Lane::ALL {
            if let Some(start) = open[lane.index()] {
                holds.push(HoldSpan {
                    lane,
                    start,
                    end: f32::INFINITY,
                });
            }
        }

        Self {
            presses,
            holds,
            last_arrival,
        }
    }

    /// Masks for the frame at music time `t`, `dt` seconds after the previous one.
    pub fn frame(&self, t: f32, dt: f32) -> (ActionKey, ActionKey) {
        let half = dt * 0.5;
        let first = self.presses.partition_point(|(a, _)| *a <= t - half);
        let pressed = self.presses[first..]
            .iter()
            .take_while(|(a, _)| *a <= t + half)
            .fold(ActionKey::empty(), |acc, (_, lanes)| acc | *lanes);

        let held = self
            .holds
            .iter()
            .filter(|h| h.start <= t + half && h.end > t - dt)
            .fold(ActionKey::empty(), |acc, h| acc | h.lane.key());

        (pressed, pressed | held)
    }

    /// Music time of the last note row with something on it.
    pub fn last_arrival(&self) -> f32 {
        self.last_arrival
    }

    pub fn press_count(&self) -> usize {
        self.presses.len()
    }
}

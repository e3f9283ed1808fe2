//! Transient score-mark sprites spawned for every judged lane.

use crate::models::engine::SCORE_MARK_DURATION;
use crate::models::stats::Judgement;
use crate::shared::ring_queue::RingQueue;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreMarkVisual {
    /// Session clock at spawn (seconds since the session started).
    pub spawn_time: f32,
    pub duration: f32,
    pub judgement: Judgement,
    /// Lane ordinal inside the judgement that spawned it; used to offset sprites.
    pub salt: u32,
}

impl ScoreMarkVisual {
    /// Animation progress in `0.0..=1.0`.
    pub fn progress(&self, now: f32) -> f32 {
        ((now - self.spawn_time) / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreMarkVisuals {
    queue: RingQueue<ScoreMarkVisual>,
}

impl ScoreMarkVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns one visual per lane.
    pub fn spawn(&mut self, now: f32, judgement: Judgement, lane_count: u32) {
        for salt in 0..lane_count {
            self.queue.enqueue(ScoreMarkVisual {
                spawn_time: now,
                duration: SCORE_MARK_DURATION,
                judgement,
                salt,
            });
        }
    }

    /// Drops expired visuals from the head. Spawn times are non-decreasing, so
    /// the first live visual ends the scan.
    pub fn expire(&mut self, now: f32) {
        while let Some(head) = self.queue.peek() {
            if now - head.spawn_time < head.duration {
                break;
            }
            self.queue.dequeue();
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreMarkVisual> + '_ {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

//! Hit statistics and judgement types.
//!
//! This module defines the judgement tiers used for scoring and the
//! per-session counters that accumulate them.

use serde::{Deserialize, Serialize};

/// Hit judgement types from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    /// Tightest window.
    Perfect,
    Nice,
    Good,
    Ok,
    /// Widest window; scores but breaks combo.
    Meh,
    /// Unhit tap or dropped hold.
    Miss,
}

impl Judgement {
    pub const ALL: [Judgement; 6] = [
        Judgement::Perfect,
        Judgement::Nice,
        Judgement::Good,
        Judgement::Ok,
        Judgement::Meh,
        Judgement::Miss,
    ];

    /// Display label, as shown by the score-mark animation.
    pub fn label(self) -> &'static str {
        match self {
            Judgement::Perfect => "Perfect",
            Judgement::Nice => "Nice",
            Judgement::Good => "Good",
            Judgement::Ok => "Ok",
            Judgement::Meh => "Meh",
            Judgement::Miss => "Miss",
        }
    }
}

/// Accumulated hit statistics for a play session.
///
/// Counts are per scored lane, so a two-lane chord hit at Perfect adds 2.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub nice: u32,
    pub good: u32,
    pub ok: u32,
    pub meh: u32,
    pub miss: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` lanes to the counter of `judgement`.
    pub fn record(&mut self, judgement: Judgement, count: u32) {
        let slot = match judgement {
            Judgement::Perfect => &mut self.perfect,
            Judgement::Nice => &mut self.nice,
            Judgement::Good => &mut self.good,
            Judgement::Ok => &mut self.ok,
            Judgement::Meh => &mut self.meh,
            Judgement::Miss => &mut self.miss,
        };
        *slot += count;
    }

    pub fn count(&self, judgement: Judgement) -> u32 {
        match judgement {
            Judgement::Perfect => self.perfect,
            Judgement::Nice => self.nice,
            Judgement::Good => self.good,
            Judgement::Ok => self.ok,
            Judgement::Meh => self.meh,
            Judgement::Miss => self.miss,
        }
    }

    /// Total number of scored lanes.
    pub fn total(&self) -> u32 {
        Judgement::ALL.iter().map(|j| self.count(*j)).sum()
    }
}

/// Accuracy as a ratio in `0.0..=1.0`.
///
/// Returns 1.0 before anything has been scored.
pub fn calculate_accuracy(score: u64, max_score: u64) -> f64 {
    if max_score == 0 {
        return 1.0;
    }
    score as f64 / max_score as f64
}

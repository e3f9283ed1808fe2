//! Judgement window table: timing tolerances mapped to score tiers.

use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};

/// One tier of the judgement table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMark {
    pub judgement: Judgement,
    /// Half-width of the window around the arrival time (seconds).
    pub window_seconds: f32,
    pub points: u32,
    pub breaks_combo: bool,
}

impl ScoreMark {
    pub const fn new(judgement: Judgement, window_seconds: f32, points: u32, breaks_combo: bool) -> Self {
        Self {
            judgement,
            window_seconds,
            points,
            breaks_combo,
        }
    }

    pub fn label(&self) -> &'static str {
        self.judgement.label()
    }
}

/// Tolerance override for the five tiers, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowTolerances {
    pub meh: f32,
    pub ok: f32,
    pub good: f32,
    pub nice: f32,
    pub perfect: f32,
}

impl Default for WindowTolerances {
    fn default() -> Self {
        Self {
            meh: 0.160,
            ok: 0.100,
            good: 0.060,
            nice: 0.040,
            perfect: 0.017,
        }
    }
}

/// Ordered judgement table, widest window first.
#[derive(Debug, Clone, PartialEq)]
pub struct HitWindow {
    marks: [ScoreMark; 5],
    miss: ScoreMark,
}

impl HitWindow {
    /// Standard table: Meh 160ms/10, Ok 100ms/30, Good 60ms/50, Nice 40ms/80, Perfect 17ms/100.
    pub fn new() -> Self {
        Self::build(WindowTolerances::default())
    }

    /// Builds the table with custom tolerances and the standard points.
    ///
    /// Tolerances must be strictly positive and strictly narrowing from Meh to Perfect.
    pub fn from_tolerances(t: WindowTolerances) -> Result<Self, String> {
        let widths = [t.meh, t.ok, t.good, t.nice, t.perfect];
        if widths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(format!("tolerances must be positive: {widths:?}"));
        }
        if widths.windows(2).any(|pair| pair[1] >= pair[0]) {
            return Err(format!("tolerances must narrow from meh to perfect: {widths:?}"));
        }
        Ok(Self::build(t))
    }

    fn build(t: WindowTolerances) -> Self {
        Self {
            marks: [
                ScoreMark::new(Judgement::Meh, t.meh, 10, true),
                ScoreMark::new(Judgement::Ok, t.ok, 30, false),
                ScoreMark::new(Judgement::Good, t.good, 50, false),
                ScoreMark::new(Judgement::Nice, t.nice, 80, false),
                ScoreMark::new(Judgement::Perfect, t.perfect, 100, false),
            ],
            miss: ScoreMark::new(Judgement::Miss, 0.0, 0, true),
        }
    }

    /// Outermost tolerance; a note is judgeable while `|distance|` is within it.
    pub fn widest(&self) -> f32 {
        self.marks[0].window_seconds
    }

    /// Best tier, used for auto-completed holds and the max-score tally.
    pub fn best(&self) -> &ScoreMark {
        &self.marks[self.marks.len() - 1]
    }

    pub fn miss(&self) -> &ScoreMark {
        &self.miss
    }

    pub fn marks(&self) -> &[ScoreMark] {
        &self.marks
    }

    /// Tolerances of the five tiers, widest first.
    pub fn tolerances(&self) -> WindowTolerances {
        let w = |i: usize| self.marks[i].window_seconds;
        WindowTolerances {
            meh: w(0),
            ok: w(1),
            good: w(2),
            nice: w(3),
            perfect: w(4),
        }
    }

    /// Selects the narrowest tier whose window still contains `distance_seconds`.
    ///
    /// Returns `None` when the distance falls outside the widest window.
    pub fn judge(&self, distance_seconds: f32) -> Option<&ScoreMark> {
        let dist = distance_seconds.abs();
        if dist > self.widest() {
            return None;
        }
        let mut idx = 0;
        while idx + 1 < self.marks.len() && dist <= self.marks[idx + 1].window_seconds {
            idx += 1;
        }
        Some(&self.marks[idx])
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_narrowest_fitting_tier() {
        let hw = HitWindow::new();
        assert_eq!(hw.judge(0.05).map(|m| m.points), Some(50));
        assert_eq!(hw.judge(0.02).map(|m| m.judgement), Some(Judgement::Nice));
        assert_eq!(hw.judge(0.018).map(|m| m.points), Some(80));
        assert_eq!(hw.judge(0.015).map(|m| m.points), Some(100));
        assert_eq!(hw.judge(-0.015).map(|m| m.points), Some(100));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let hw = HitWindow::new();
        assert_eq!(hw.judge(0.160).map(|m| m.judgement), Some(Judgement::Meh));
        assert_eq!(hw.judge(0.017).map(|m| m.judgement), Some(Judgement::Perfect));
        assert!(hw.judge(0.161).is_none());
    }

    #[test]
    fn only_meh_and_miss_break_combo() {
        let hw = HitWindow::new();
        let breaking: Vec<Judgement> = hw
            .marks()
            .iter()
            .filter(|m| m.breaks_combo)
            .map(|m| m.judgement)
            .collect();
        assert_eq!(breaking, vec![Judgement::Meh]);
        assert!(hw.miss().breaks_combo);
        assert_eq!(hw.miss().points, 0);
    }

    #[test]
    fn tolerances_round_trip() {
        let t = WindowTolerances {
            perfect: 0.010,
            ..WindowTolerances::default()
        };
        assert_eq!(HitWindow::from_tolerances(t).unwrap().tolerances(), t);
    }

    #[test]
    fn rejects_unordered_tolerances() {
        let t = WindowTolerances {
            nice: 0.070,
            ..WindowTolerances::default()
        };
        assert!(HitWindow::from_tolerances(t).is_err());

        let t = WindowTolerances {
            perfect: 0.0,
            ..WindowTolerances::default()
        };
        assert!(HitWindow::from_tolerances(t).is_err());
    }
}

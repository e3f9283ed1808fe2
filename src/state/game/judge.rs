//! Per-frame judgement of the active window.
//!
//! All lane decisions are mask arithmetic over [`ActionKey`]: a press is
//! consumed by the first note (closest to the head) that can use it, holds are
//! tracked in a single held-lanes mask, and scoring is applied per lane.

use crate::models::engine::{ActionKey, ActiveNote, HitWindow, ScoreMark};
use crate::models::stats::{HitStats, Judgement, calculate_accuracy};
use crate::shared::ring_queue::RingQueue;
use serde::Serialize;

/// One scored judgement, as handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreEvent {
    pub judgement: Judgement,
    pub label: &'static str,
    pub points: u32,
    pub breaks_combo: bool,
    /// Number of lanes judged together.
    pub lane_count: u32,
}

/// Output of a frame update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    Score(ScoreEvent),
    /// A note reached its arrival time; only emitted when assist cues are on.
    AssistCue { arrival_time: f32 },
}

/// Running score, combo and per-tier counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreState {
    pub score: u64,
    /// Sum of the best tier's points over every scored lane.
    pub max_score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub stats: HitStats,
}

impl ScoreState {
    /// Scores `count` lanes with `mark`.
    pub fn apply(&mut self, mark: &ScoreMark, best_points: u32, count: u32) {
        self.score += u64::from(count) * u64::from(mark.points);
        self.max_score += u64::from(count) * u64::from(best_points);
        self.combo = if mark.breaks_combo {
            0
        } else {
            self.combo + count
        };
        self.max_combo = self.max_combo.max(self.combo);
        self.stats.record(mark.judgement, count);
    }

    /// `score / max_score`, or 1.0 before anything was scored.
    pub fn accuracy(&self) -> f64 {
        calculate_accuracy(self.score, self.max_score)
    }
}

#[derive(Debug, Clone)]
pub struct JudgmentEngine {
    hit_window: HitWindow,
    /// Lanes with an open hold that is currently satisfied.
    held: ActionKey,
    score: ScoreState,
    assist_cues: bool,
    events: Vec<GameEvent>,
}

impl JudgmentEngine {
    pub fn new(hit_window: HitWindow, assist_cues: bool) -> Self {
        Self {
            hit_window,
            held: ActionKey::empty(),
            score: ScoreState::default(),
            assist_cues,
            events: Vec::new(),
        }
    }

    /// Judges every note of `active` at time `now`.
    ///
    /// `pressed` holds the lanes that went down this frame, `down` every lane
    /// currently down. Notes are never removed here.
    pub fn update(
        &mut self,
        active: &mut RingQueue<ActiveNote>,
        now: f32,
        pressed: ActionKey,
        down: ActionKey,
    ) {
        let widest = self.hit_window.widest();
        let best = *self.hit_window.best();
        let miss = *self.hit_window.miss();
        let mut claimed = ActionKey::empty();

        for i in 0..active.len() {
            let note = &mut active[i];

            if !note.passed_target && note.arrival_time <= now {
                note.passed_target = true;
                if self.assist_cues {
                    self.events.push(GameEvent::AssistCue {
                        arrival_time: note.arrival_time,
                    });
                }
                // Hold still down when its end arrives: completes at the best tier.
                let completed = note.note.hold_end & self.held;
                if !completed.is_empty() {
                    note.tap_hit |= completed;
                    self.held &= !completed;
                    self.apply_score(&best, completed.count());
                }
            }

            let signed_dist = note.arrival_time - now;
            if signed_dist.abs() <= widest {
                let able = !note.tap_hit & !claimed & pressed;
                let tap = note.note.tap & able;
                let hold_start = note.note.hold_start & able;
                let released = self.held & !down & note.note.hold_end & !note.tap_hit;
                let resolved = tap | hold_start | released;

                note.tap_hit |= resolved;
                claimed |= tap | hold_start;
                self.held = (self.held & !released) | hold_start;

                if !resolved.is_empty() {
                    if let Some(mark) = self.hit_window.judge(signed_dist).copied() {
                        self.apply_score(&mark, resolved.count());
                    }
                }
            } else if signed_dist < -widest && !note.passed_judgement {
                note.passed_judgement = true;
                let missed = note.note.tap & !note.tap_hit;
                if !missed.is_empty() {
                    self.apply_score(&miss, missed.count());
                }
            }
        }

        let dropped = self.held & !down;
        if !dropped.is_empty() {
            self.held &= !dropped;
            self.apply_score(&miss, dropped.count());
        }
    }

    fn apply_score(&mut self, mark: &ScoreMark, count: u32) {
        let best_points = self.hit_window.best().points;
        self.score.apply(mark, best_points, count);
        self.events.push(GameEvent::Score(ScoreEvent {
            judgement: mark.judgement,
            label: mark.label(),
            points: mark.points,
            breaks_combo: mark.breaks_combo,
            lane_count: count,
        }));
    }

    /// Forgets every open hold without scoring it.
    pub fn release_all(&mut self) {
        self.held = ActionKey::empty();
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn held(&self) -> ActionKey {
        self.held
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn hit_window(&self) -> &HitWindow {
        &self.hit_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::Note;

    fn active(entries: &[(Note, f32)]) -> RingQueue<ActiveNote> {
        let mut q = RingQueue::new();
        for (i, (note, t)) in entries.iter().enumerate() {
            q.enqueue(ActiveNote::new(*note, i, 0, *t));
        }
        q
    }

    fn tap(lanes: ActionKey) -> Note {
        Note {
            measure_length: 1,
            tap: lanes,
            ..Note::default()
        }
    }

    fn judge() -> JudgmentEngine {
        JudgmentEngine::new(HitWindow::new(), false)
    }

    fn scores(engine: &mut JudgmentEngine) -> Vec<(Judgement, u32)> {
        engine
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Score(s) => Some((s.judgement, s.lane_count)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tap_scored_by_distance() {
        let mut q = active(&[(tap(ActionKey::LEFT | ActionKey::RIGHT), 1.0)]);
        let mut j = judge();
        let both = ActionKey::LEFT | ActionKey::RIGHT;
        j.update(&mut q, 0.95, both, both);
        assert_eq!(scores(&mut j), vec![(Judgement::Good, 2)]);
        assert_eq!(j.score().score, 100);
        assert_eq!(j.score().max_score, 200);
        assert_eq!(j.score().combo, 2);
        assert_eq!(q[0].tap_hit, both);
    }

    #[test]
    fn press_outside_window_is_ignored() {
        let mut q = active(&[(tap(ActionKey::UP), 1.0)]);
        let mut j = judge();
        j.update(&mut q, 0.5, ActionKey::UP, ActionKey::UP);
        assert!(scores(&mut j).is_empty());
        assert!(q[0].tap_hit.is_empty());
    }

    #[test]
    fn earlier_note_claims_the_press() {
        let mut q = active(&[(tap(ActionKey::DOWN), 1.0), (tap(ActionKey::DOWN), 1.1)]);
        let mut j = judge();
        j.update(&mut q, 1.0, ActionKey::DOWN, ActionKey::DOWN);
        assert_eq!(scores(&mut j), vec![(Judgement::Perfect, 1)]);
        assert_eq!(q[0].tap_hit, ActionKey::DOWN);
        assert!(q[1].tap_hit.is_empty());

        // Next press goes to the second note.
        j.update(&mut q, 1.1, ActionKey::DOWN, ActionKey::DOWN);
        assert_eq!(scores(&mut j), vec![(Judgement::Perfect, 1)]);
        assert_eq!(q[1].tap_hit, ActionKey::DOWN);
    }

    #[test]
    fn unhit_tap_misses_once() {
        let mut q = active(&[(tap(ActionKey::LEFT | ActionKey::UP), 1.0)]);
        let mut j = judge();
        j.update(&mut q, 1.0, ActionKey::LEFT, ActionKey::LEFT);
        assert_eq!(scores(&mut j), vec![(Judgement::Perfect, 1)]);
        j.update(&mut q, 1.2, ActionKey::empty(), ActionKey::empty());
        assert_eq!(scores(&mut j), vec![(Judgement::Miss, 1)]);
        j.update(&mut q, 1.3, ActionKey::empty(), ActionKey::empty());
        assert!(scores(&mut j).is_empty());
        assert!(q[0].passed_judgement);
        assert_eq!(j.score().combo, 0);
        assert_eq!(j.score().max_combo, 1);
        assert_eq!(j.score().stats.miss, 1);
    }

    #[test]
    fn hold_completes_at_best_tier_on_arrival() {
        let start = Note {
            measure_length: 1,
            hold_start: ActionKey::RIGHT,
            ..Note::default()
        };
        let end = Note {
            measure_length: 1,
            hold_end: ActionKey::RIGHT,
            ..Note::default()
        };
        let mut q = active(&[(start, 1.0), (end, 2.0)]);
        let mut j = judge();
        let r = ActionKey::RIGHT;
        j.update(&mut q, 1.05, r, r);
        assert_eq!(scores(&mut j), vec![(Judgement::Good, 1)]);
        assert_eq!(j.held(), r);

        j.update(&mut q, 1.9, ActionKey::empty(), r);
        assert!(scores(&mut j).is_empty());

        j.update(&mut q, 2.0, ActionKey::empty(), ActionKey::empty());
        assert_eq!(scores(&mut j), vec![(Judgement::Perfect, 1)]);
        assert!(j.held().is_empty());
        assert_eq!(j.score().combo, 2);
    }

    #[test]
    fn early_release_near_end_scores_by_distance() {
        let start = Note {
            measure_length: 1,
            hold_start: ActionKey::LEFT,
            ..Note::default()
        };
        let end = Note {
            measure_length: 1,
            hold_end: ActionKey::LEFT,
            ..Note::default()
        };
        let mut q = active(&[(start, 1.0), (end, 2.0)]);
        let mut j = judge();
        j.update(&mut q, 1.0, ActionKey::LEFT, ActionKey::LEFT);
        scores(&mut j);
        j.update(&mut q, 1.92, ActionKey::empty(), ActionKey::empty());
        assert_eq!(scores(&mut j), vec![(Judgement::Ok, 1)]);
        assert_eq!(q[1].tap_hit, ActionKey::LEFT);
        assert!(j.held().is_empty());
    }

    #[test]
    fn dangling_hold_is_a_miss() {
        let start = Note {
            measure_length: 1,
            hold_start: ActionKey::UP,
            ..Note::default()
        };
        let end = Note {
            measure_length: 1,
            hold_end: ActionKey::UP,
            ..Note::default()
        };
        let mut q = active(&[(start, 1.0), (end, 3.0)]);
        let mut j = judge();
        j.update(&mut q, 1.0, ActionKey::UP, ActionKey::UP);
        scores(&mut j);
        j.update(&mut q, 2.0, ActionKey::empty(), ActionKey::empty());
        assert_eq!(scores(&mut j), vec![(Judgement::Miss, 1)]);
        assert!(j.held().is_empty());

        // The end note arrives with nothing held: no further scoring.
        j.update(&mut q, 3.0, ActionKey::empty(), ActionKey::empty());
        assert!(scores(&mut j).is_empty());
    }

    #[test]
    fn assist_cue_on_arrival() {
        let mut q = active(&[(tap(ActionKey::LEFT), 0.5)]);
        let mut j = JudgmentEngine::new(HitWindow::new(), true);
        j.update(&mut q, 0.4, ActionKey::empty(), ActionKey::empty());
        assert!(j.take_events().is_empty());
        j.update(&mut q, 0.5, ActionKey::empty(), ActionKey::empty());
        assert_eq!(
            j.take_events(),
            vec![GameEvent::AssistCue { arrival_time: 0.5 }]
        );
        assert!(q[0].passed_target);
    }

    #[test]
    fn combo_accumulates_and_resets() {
        let hw = HitWindow::new();
        let mut s = ScoreState::default();
        let perfect = *hw.best();
        s.apply(&perfect, 100, 1);
        s.apply(&perfect, 100, 2);
        assert_eq!(s.combo, 3);
        s.apply(hw.miss(), 100, 1);
        assert_eq!(s.combo, 0);
        assert_eq!(s.max_combo, 3);
        s.apply(&perfect, 100, 1);
        assert_eq!(s.max_combo, 3);
        assert_eq!(s.score, 400);
        assert_eq!(s.max_score, 500);
        assert!((s.accuracy() - 0.8).abs() < 1e-9);
    }
}

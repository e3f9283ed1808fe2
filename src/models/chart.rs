//! Parsed chart data: a `Track` with its tempo map and difficulty maps.

use crate::models::engine::Note;
use crate::parsing::writer;
use std::fmt;
use std::path::PathBuf;

/// Title used when a chart carries no `#TITLE` tag.
pub const DEFAULT_TITLE: &str = "Title not specified";

/// One `beat=bpm` entry of the tempo map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoPoint {
    pub beat: f32,
    pub bpm: f32,
}

impl TempoPoint {
    pub const fn new(beat: f32, bpm: f32) -> Self {
        Self { beat, bpm }
    }

    #[inline]
    pub fn beats_per_second(&self) -> f32 {
        self.bpm / 60.0
    }
}

/// A song: metadata, tempo map and every playable difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    /// Audio file, relative to the chart's directory.
    pub audio_path: String,
    /// Music-to-chart alignment in seconds; may be negative.
    pub offset: f32,
    /// Tempo changes in file order.
    pub tempo_map: Vec<TempoPoint>,
    /// Difficulty maps sorted ascending by meter.
    pub maps: Vec<TrackMap>,
    /// File the track was loaded from, attached after parsing.
    pub source_path: Option<PathBuf>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            audio_path: String::new(),
            offset: 0.0,
            tempo_map: Vec::new(),
            maps: Vec::new(),
            source_path: None,
        }
    }
}

impl Track {
    /// Stable sort by meter; equal meters keep parse order.
    pub fn sort_maps(&mut self) {
        self.maps.sort_by_key(|map| map.meter);
    }

    /// Audio file location, relative to the directory of `source_path`.
    ///
    /// Returns `None` when no source path has been attached or the chart
    /// names no audio file.
    pub fn resolve_audio_path(&self) -> Option<PathBuf> {
        if self.audio_path.is_empty() {
            return None;
        }
        let source = self.source_path.as_ref()?;
        let dir = source.parent().map(PathBuf::from).unwrap_or_default();
        Some(dir.join(&self.audio_path))
    }

    pub fn map(&self, index: usize) -> Option<&TrackMap> {
        self.maps.get(index)
    }

    /// MD5 hex digest identifying one of this track's maps.
    ///
    /// Covers the canonical offset and tempo lines plus the map's note
    /// block, so formatting in the source file does not matter but any
    /// timing change does.
    pub fn chart_hash(&self, map: &TrackMap) -> String {
        let mut canonical = writer::timing_to_string(self.offset, &self.tempo_map);
        canonical.push_str(&writer::map_to_string(map));
        format!("{:x}", md5::compute(canonical.as_bytes()))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Audio: {}", self.audio_path)?;
        writeln!(f, "Offset: {}", self.offset)?;
        let bpms: Vec<String> = self
            .tempo_map
            .iter()
            .map(|p| format!("({}, {})", p.beat, p.bpm))
            .collect();
        writeln!(f, "BPMs: {}", bpms.join(","))?;
        for map in &self.maps {
            writeln!(f, "Map:")?;
            for line in map.to_string().lines() {
                writeln!(f, "    {line}")?;
            }
        }
        Ok(())
    }
}

/// One difficulty variant of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMap {
    pub difficulty: String,
    pub meter: i32,
    pub notes: Vec<Note>,
}

impl Default for TrackMap {
    fn default() -> Self {
        Self {
            difficulty: "None".to_string(),
            meter: -1,
            notes: Vec::new(),
        }
    }
}

impl TrackMap {
    /// Number of measures covered by the note sequence.
    pub fn measure_count(&self) -> u32 {
        self.notes.last().map(|n| n.measure + 1).unwrap_or(0)
    }

    /// Number of rows that carry at least one action.
    pub fn playable_rows(&self) -> usize {
        self.notes.iter().filter(|n| !n.is_empty()).count()
    }

    /// Total number of lane events that will be scored: taps, hold starts
    /// and hold ends.
    pub fn lane_events(&self) -> u32 {
        self.notes.iter().map(|n| n.actions().count()).sum()
    }
}

impl fmt::Display for TrackMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Difficulty: {}", self.difficulty)?;
        writeln!(f, "Meter: {}", self.meter)?;
        for note in &self.notes {
            writeln!(f, "{} \t{} \t{}", note.measure, note.measure_length, note.tap)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::ActionKey;
    use std::path::Path;

    fn map(meter: i32, difficulty: &str) -> TrackMap {
        TrackMap {
            difficulty: difficulty.to_string(),
            meter,
            notes: Vec::new(),
        }
    }

    #[test]
    fn sort_maps_is_stable() {
        let mut track = Track {
            maps: vec![map(5, "a"), map(1, "b"), map(5, "c"), map(3, "d")],
            ..Track::default()
        };
        track.sort_maps();
        let order: Vec<&str> = track.maps.iter().map(|m| m.difficulty.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn resolve_audio_path_needs_source() {
        let mut track = Track {
            audio_path: "song.ogg".to_string(),
            ..Track::default()
        };
        assert_eq!(track.resolve_audio_path(), None);

        track.source_path = Some(PathBuf::from("charts/song/song.sm"));
        assert_eq!(
            track.resolve_audio_path().as_deref(),
            Some(Path::new("charts/song/song.ogg"))
        );
    }

    #[test]
    fn chart_hash_depends_on_notes() {
        let mut a = map(1, "Easy");
        a.notes.push(Note {
            measure: 0,
            measure_length: 1,
            tap: ActionKey::LEFT,
            ..Note::default()
        });
        let mut b = a.clone();
        let track = Track {
            tempo_map: vec![TempoPoint::new(0.0, 120.0)],
            ..Track::default()
        };
        assert_eq!(track.chart_hash(&a), track.chart_hash(&b));
        assert_eq!(track.chart_hash(&a).len(), 32);

        b.notes[0].tap = ActionKey::RIGHT;
        assert_ne!(track.chart_hash(&a), track.chart_hash(&b));
    }

    #[test]
    fn chart_hash_depends_on_timing() {
        let mut m = map(1, "Easy");
        m.notes.push(Note {
            measure: 0,
            measure_length: 4,
            tap: ActionKey::UP,
            ..Note::default()
        });
        let slow = Track {
            tempo_map: vec![TempoPoint::new(0.0, 120.0)],
            ..Track::default()
        };
        let fast = Track {
            tempo_map: vec![TempoPoint::new(0.0, 240.0)],
            ..slow.clone()
        };
        let shifted = Track {
            offset: 0.3,
            ..slow.clone()
        };
        assert_ne!(slow.chart_hash(&m), fast.chart_hash(&m));
        assert_ne!(slow.chart_hash(&m), shifted.chart_hash(&m));

        // Title and audio are not part of the identity.
        let renamed = Track {
            title: "Other".to_string(),
            audio_path: "other.ogg".to_string(),
            ..slow.clone()
        };
        assert_eq!(slow.chart_hash(&m), renamed.chart_hash(&m));
    }

    #[test]
    fn lane_events_counts_every_action() {
        let mut m = map(1, "Easy");
        m.notes.push(Note {
            measure: 0,
            measure_length: 2,
            tap: ActionKey::LEFT | ActionKey::UP,
            hold_start: ActionKey::RIGHT,
            ..Note::default()
        });
        m.notes.push(Note {
            measure: 0,
            measure_length: 2,
            hold_end: ActionKey::RIGHT,
            ..Note::default()
        });
        assert_eq!(m.lane_events(), 4);
        assert_eq!(m.playable_rows(), 2);
        assert_eq!(m.measure_count(), 1);
    }
}

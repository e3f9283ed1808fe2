//! Serializes a `Track` back into the chart text format.
//!
//! Output re-parses to the same title, offset, tempo map and note tuples.
//! Values are written verbatim: `;` and `:` inside them are not escaped.

use crate::models::chart::{TempoPoint, Track, TrackMap};
use crate::models::engine::{Lane, Note};
use std::io::{self, Write};

const CHART_TYPE: &str = "dance-single";
const RADAR_VALUES: &str = "0,0,0,0,0";
const HEADER_INDENT: &str = "     ";

/// Writes the full chart: metadata tags followed by one `#NOTES` block per map.
pub fn write_track<W: Write>(track: &Track, out: &mut W) -> io::Result<()> {
    out.write_all(track_to_string(track).as_bytes())
}

pub fn track_to_string(track: &Track) -> String {
    let mut s = String::new();
    s.push_str(&format!("#TITLE:{};\n", track.title));
    s.push_str(&format!("#MUSIC:{};\n", track.audio_path));
    s.push_str(&timing_to_string(track.offset, &track.tempo_map));
    for map in &track.maps {
        s.push('\n');
        s.push_str(&map_to_string(map));
    }
    s
}

/// The `#OFFSET` and `#BPMS` lines.
pub fn timing_to_string(offset: f32, tempo_map: &[TempoPoint]) -> String {
    let bpms: Vec<String> = tempo_map
        .iter()
        .map(|p| format!("{}={}", p.beat, p.bpm))
        .collect();
    format!("#OFFSET:{};\n#BPMS:{};\n", offset, bpms.join(","))
}

/// One `#NOTES` block, including its header lines.
pub fn map_to_string(map: &TrackMap) -> String {
    let mut s = String::new();
    let meter = map.meter.to_string();
    s.push_str("#NOTES:\n");
    for field in [CHART_TYPE, "", map.difficulty.as_str(), meter.as_str(), RADAR_VALUES] {
        s.push_str(HEADER_INDENT);
        s.push_str(field);
        s.push_str(":\n");
    }

    // Empty measures still need their separator to keep later measure indices.
    let mut current = 0u32;
    for note in &map.notes {
        while current < note.measure {
            s.push_str(",\n");
            current += 1;
        }
        s.push_str(&row_to_string(note));
        s.push('\n');
    }
    s.push_str(";\n");
    s
}

/// Four-column row text: `1` tap, `2` hold start, `3` hold end, `0` otherwise.
pub fn row_to_string(note: &Note) -> String {
    Lane::ALL
        .iter()
        .map(|lane| {
            let key = lane.key();
            if note.tap.contains(key) {
                '1'
            } else if note.hold_start.contains(key) {
                '2'
            } else if note.hold_end.contains(key) {
                '3'
            } else {
                '0'
            }
        })
        .collect()
}

//! Line-oriented parser for `.sm` style charts.
//!
//! ```text
//! #TITLE:Song;
//! #MUSIC:song.ogg;
//! #OFFSET:-0.05;
//! #BPMS:0.0=120.0,64.0=180.0;
//! #NOTES:
//!      dance-single:
//!      author:
//!      Hard:
//!      9:
//!      0,0,0,0,0:
//! 1000
//! 0200
//! ,
//! 0300
//! ;
//! ```

use super::error::ParseError;
use crate::models::chart::{TempoPoint, Track, TrackMap};
use crate::models::engine::{ActionKey, NUM_LANES, Note};
use std::io::BufRead;

const TAP_SYMBOL: char = '1';
const HOLD_START_SYMBOL: char = '2';
const HOLD_END_SYMBOL: char = '3';

/// Line source that remembers the 1-based number of the last line read.
struct LineReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, ParseError> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                let mut line = line?;
                self.line_no += 1;
                if self.line_no == 1 {
                    if let Some(stripped) = line.strip_prefix('\u{feff}') {
                        line = stripped.to_string();
                    }
                }
                if line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
        }
    }
}

/// Parses a whole chart from a buffered reader.
///
/// Maps are stable-sorted by meter before the track is returned. Any grammar
/// violation aborts the parse.
pub fn parse_track<R: BufRead>(reader: R) -> Result<Track, ParseError> {
    let mut lines = LineReader::new(reader);
    let mut track = Track::default();

    while let Some(raw) = lines.next_line()? {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('/') {
            continue;
        }
        if !line.starts_with('#') {
            return Err(ParseError::UnexpectedLine {
                line: lines.line_no,
                content: line.to_string(),
            });
        }

        let Some(tag_end) = line.find(':') else {
            return Err(ParseError::MissingSeparator {
                line: lines.line_no,
                separator: ':',
                content: line.to_string(),
            });
        };
        let tag = line[1..tag_end].trim().to_ascii_uppercase();

        if tag == "NOTES" {
            let map = parse_map(&mut lines)?;
            log::debug!(
                "PARSER: map '{}' (meter {}) with {} rows",
                map.difficulty,
                map.meter,
                map.notes.len()
            );
            track.maps.push(map);
            continue;
        }

        let rest = &line[tag_end + 1..];
        let Some(value_end) = rest.find(';') else {
            return Err(ParseError::MissingSeparator {
                line: lines.line_no,
                separator: ';',
                content: line.to_string(),
            });
        };
        let value = &rest[..value_end];

        match tag.as_str() {
            "TITLE" => track.title = value.to_string(),
            "MUSIC" => track.audio_path = value.to_string(),
            "OFFSET" => track.offset = parse_float(value, lines.line_no)?,
            "BPMS" => track.tempo_map = parse_bpms(value, lines.line_no)?,
            _ => {}
        }
    }

    track.sort_maps();
    log::info!(
        "PARSER: parsed '{}' ({} maps, {} tempo points)",
        track.title,
        track.maps.len(),
        track.tempo_map.len()
    );
    Ok(track)
}

/// Parses a chart held in memory.
pub fn parse_str(source: &str) -> Result<Track, ParseError> {
    parse_track(source.as_bytes())
}

fn parse_float(value: &str, line: usize) -> Result<f32, ParseError> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|_| ParseError::InvalidNumber {
            line,
            value: value.to_string(),
        })
}

/// `beat=bpm` pairs separated by commas, kept in file order.
fn parse_bpms(value: &str, line: usize) -> Result<Vec<TempoPoint>, ParseError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<TempoPoint, ParseError> {
            let (beat, bpm) =
                entry
                    .split_once('=')
                    .ok_or_else(|| ParseError::MissingSeparator {
                        line,
                        separator: '=',
                        content: entry.to_string(),
                    })?;
            Ok(TempoPoint::new(
                parse_float(beat, line)?,
                parse_float(bpm, line)?,
            ))
        })
        .collect()
}

fn next_header_line<R: BufRead>(lines: &mut LineReader<R>) -> Result<String, ParseError> {
    lines.next_line()?.ok_or(ParseError::UnexpectedEof {
        line: lines.line_no,
    })
}

/// Strips the 3-character indent and the trailing `:` from a header field.
fn header_field(raw: &str, line: usize) -> Result<String, ParseError> {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 4 {
        return Err(ParseError::UnexpectedLine {
            line,
            content: raw.to_string(),
        });
    }
    let inner: String = chars[3..chars.len() - 1].iter().collect();
    Ok(inner.trim().to_string())
}

/// Reads one `#NOTES` block: five header lines followed by rows until `;`.
fn parse_map<R: BufRead>(lines: &mut LineReader<R>) -> Result<TrackMap, ParseError> {
    let notes_line = lines.line_no;
    let mut map = TrackMap::default();

    // Chart type, then description/author.
    next_header_line(lines)?;
    next_header_line(lines)?;

    let difficulty = next_header_line(lines)?;
    map.difficulty = header_field(&difficulty, lines.line_no)?;

    let meter = next_header_line(lines)?;
    let meter = header_field(&meter, lines.line_no)?;
    map.meter = meter.parse::<i32>().map_err(|_| ParseError::InvalidNumber {
        line: lines.line_no,
        value: meter.clone(),
    })?;

    // Radar values.
    next_header_line(lines)?;

    let mut measure = 0u32;
    let mut staging: Vec<Note> = Vec::new();
    let mut open_holds = ActionKey::empty();
    let mut unmatched_ends = 0u32;

    loop {
        let Some(raw) = lines.next_line()? else {
            return Err(ParseError::UnterminatedNotes { line: notes_line });
        };
        let row = strip_comment(&raw).trim();
        if row.is_empty() {
            continue;
        }
        if row.starts_with(';') {
            break;
        }
        if row.starts_with(',') {
            finalize_measure(&mut map.notes, &mut staging);
            measure += 1;
            continue;
        }
        if row.chars().count() != NUM_LANES {
            return Err(ParseError::WrongColumnCount {
                line: lines.line_no,
                row: row.to_string(),
            });
        }

        let note = Note {
            measure,
            measure_length: 0,
            tap: ActionKey::from_row(row, TAP_SYMBOL),
            hold_start: ActionKey::from_row(row, HOLD_START_SYMBOL),
            hold_end: ActionKey::from_row(row, HOLD_END_SYMBOL),
        };

        if !(note.hold_end & !open_holds).is_empty() {
            unmatched_ends += 1;
        }
        open_holds = (open_holds & !note.hold_end) | note.hold_start;

        staging.push(note);
    }
    finalize_measure(&mut map.notes, &mut staging);

    if unmatched_ends > 0 {
        log::warn!(
            "PARSER: map '{}' has {} hold end(s) without an open hold",
            map.difficulty,
            unmatched_ends
        );
    }
    Ok(map)
}

/// Writes the row count of the finished measure into every staged note.
fn finalize_measure(notes: &mut Vec<Note>, staging: &mut Vec<Note>) {
    let length = staging.len() as u32;
    notes.extend(staging.drain(..).map(|mut note| {
        note.measure_length = length;
        note
    }));
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "#NOTES:\n     dance-single:\n     :\n     Hard:\n     9:\n     0,0,0,0,0:\n";

    fn chart(body: &str) -> String {
        format!("#TITLE:Test;\n#BPMS:0.0=120.0;\n{HEADER}{body}")
    }

    #[test]
    fn parses_metadata() {
        let track =
            parse_str("#TITLE:My Song;\n#MUSIC:audio.ogg;\n#OFFSET:-0.25;\n#BPMS:0.0=120.0, 16.0=90;\n")
                .unwrap();
        assert_eq!(track.title, "My Song");
        assert_eq!(track.audio_path, "audio.ogg");
        assert_eq!(track.offset, -0.25);
        assert_eq!(
            track.tempo_map,
            vec![TempoPoint::new(0.0, 120.0), TempoPoint::new(16.0, 90.0)]
        );
        assert!(track.maps.is_empty());
    }

    #[test]
    fn default_title_and_ignored_tags() {
        let track = parse_str("// comment\n\n#ARTIST:someone;\n#STOPS:;\n").unwrap();
        assert_eq!(track.title, "Title not specified");
        assert!(track.tempo_map.is_empty());
    }

    #[test]
    fn value_may_be_empty_or_contain_colons() {
        let track = parse_str("#TITLE:a:b;\n#MUSIC:;\n").unwrap();
        assert_eq!(track.title, "a:b");
        assert_eq!(track.audio_path, "");
    }

    #[test]
    fn parses_rows_and_measure_lengths() {
        let track = parse_str(&chart("1000\n0000\n0010\n0001\n,\n2000\n3000\n;\n")).unwrap();
        let map = &track.maps[0];
        assert_eq!(map.difficulty, "Hard");
        assert_eq!(map.meter, 9);
        assert_eq!(map.notes.len(), 6);
        assert!(map.notes[..4].iter().all(|n| n.measure == 0 && n.measure_length == 4));
        assert!(map.notes[4..].iter().all(|n| n.measure == 1 && n.measure_length == 2));
        assert_eq!(map.notes[0].tap, ActionKey::LEFT);
        assert!(map.notes[1].is_empty());
        assert_eq!(map.notes[2].tap, ActionKey::UP);
        assert_eq!(map.notes[4].hold_start, ActionKey::LEFT);
        assert_eq!(map.notes[5].hold_end, ActionKey::LEFT);
    }

    #[test]
    fn unmodeled_symbols_are_empty() {
        let track = parse_str(&chart("M4L0\n;\n")).unwrap();
        assert!(track.maps[0].notes[0].is_empty());
    }

    #[test]
    fn row_comments_and_crlf_are_ignored() {
        let track = parse_str(&chart("1001 // jump\r\n,  // measure 1\r\n0110\r\n;\r\n")).unwrap();
        let notes = &track.maps[0].notes;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].tap, ActionKey::LEFT | ActionKey::RIGHT);
        assert_eq!(notes[1].measure, 1);
    }

    #[test]
    fn rejects_bad_prefix() {
        let err = parse_str("#TITLE:x;\nTITLE:y;\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedLine { line: 2, .. }));
    }

    #[test]
    fn rejects_missing_terminator() {
        let err = parse_str("#TITLE:x\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingSeparator { separator: ';', .. }
        ));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            parse_str("#OFFSET:abc;\n").unwrap_err(),
            ParseError::InvalidNumber { line: 1, .. }
        ));
        assert!(matches!(
            parse_str("#BPMS:0.0=fast;\n").unwrap_err(),
            ParseError::InvalidNumber { .. }
        ));
        assert!(matches!(
            parse_str("#BPMS:120;\n").unwrap_err(),
            ParseError::MissingSeparator { separator: '=', .. }
        ));
    }

    #[test]
    fn rejects_wrong_column_count() {
        let err = parse_str(&chart("10000\n;\n")).unwrap_err();
        assert!(matches!(err, ParseError::WrongColumnCount { line: 9, .. }));
    }

    #[test]
    fn rejects_truncated_blocks() {
        let err = parse_str("#NOTES:\n     dance-single:\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));

        let err = parse_str(&chart("1000\n")).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedNotes { line: 3 }));
    }

    #[test]
    fn maps_sorted_by_meter() {
        let source = "#NOTES:\n a:\n b:\n   Hard:\n   9:\n x:\n;\n\
                      #NOTES:\n a:\n b:\n   Easy:\n   2:\n x:\n;\n";
        let track = parse_str(source).unwrap();
        let meters: Vec<i32> = track.maps.iter().map(|m| m.meter).collect();
        assert_eq!(meters, vec![2, 9]);
        assert_eq!(track.maps[0].difficulty, "Easy");
    }
}

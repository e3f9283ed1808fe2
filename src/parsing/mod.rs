//! Chart loading: text parsing, serialization and parse errors.

pub mod error;
pub mod simfile;
pub mod writer;

pub use error::ParseError;
pub use simfile::{parse_str, parse_track};
pub use writer::write_track;

use crate::models::chart::Track;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parses a chart file and attaches its path to the returned track.
pub fn load_track(path: &Path) -> Result<Track, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut track = parse_track(BufReader::new(file))?;
    track.source_path = Some(path.to_path_buf());
    Ok(track)
}

use std::path::PathBuf;
use thiserror::Error;

/// Chart parse failure. Aborts the whole parse; no partial track is kept.
///
/// Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error while reading chart: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: unexpected line '{content}'")]
    UnexpectedLine { line: usize, content: String },

    #[error("line {line}: missing '{separator}' in '{content}'")]
    MissingSeparator {
        line: usize,
        separator: char,
        content: String,
    },

    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: note row '{row}' must have exactly 4 columns")]
    WrongColumnCount { line: usize, row: String },

    #[error("line {line}: chart ended inside a NOTES header")]
    UnexpectedEof { line: usize },

    #[error("line {line}: NOTES block opened here is never terminated by ';'")]
    UnterminatedNotes { line: usize },
}

impl ParseError {
    /// Line the error was reported at, if it refers to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Io(_) | ParseError::FileRead { .. } => None,
            ParseError::UnexpectedLine { line, .. }
            | ParseError::MissingSeparator { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::WrongColumnCount { line, .. }
            | ParseError::UnexpectedEof { line }
            | ParseError::UnterminatedNotes { line } => Some(*line),
        }
    }
}

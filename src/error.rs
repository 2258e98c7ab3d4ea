//! Error types for scriptura operations.
//!
//! Rendering (verse text, chapter compilation, Markdown and USFM output) is
//! total over well-typed input and never returns these. Only the entry points
//! that decode input, package archives, or validate caller preconditions do.

use thiserror::Error;

/// Errors that can occur while decoding input or producing export artifacts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate chapter number: {0}")]
    DuplicateChapter(u32),

    #[error("Invalid archive entry name: {0:?}")]
    InvalidFileName(String),

    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid USFM: {0}")]
    InvalidUsfm(String),
}

pub type Result<T> = std::result::Result<T, Error>;

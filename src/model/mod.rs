//! Core data model for scripture conversion.
//!
//! This module contains:
//! - The Verse Object Model (one verse's markup tree)
//! - Verses and chapters, including the title/reference pseudo-verses
//! - Book and project metadata
//! - The canonical book table used for USFM identifiers and file names

mod book;
pub mod canon;
mod chapter;
mod verse;

// Re-export verse object model
pub use verse::{Attributes, VerseObject};

// Re-export chapter types
pub use chapter::{
    Chapter, ChapterText, REFERENCE_VERSE, TITLE_VERSE, Verse, is_pseudo_verse,
};

// Re-export book metadata
pub use book::{
    Book, BookProperties, Language, ObsProperties, Project, ProjectType, ScriptureProperties,
};
pub(crate) use book::non_empty;

pub use canon::{CanonBook, Testament};

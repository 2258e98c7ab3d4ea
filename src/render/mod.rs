//! Pure text extraction from the Verse Object Model.
//!
//! - [`render_inline`]: one node → text
//! - [`render_verse_text`]: a verse's node sequence → text
//!
//! Rendering is a total function over [`VerseObject`](crate::model::VerseObject):
//! nothing here returns an error. Unknown node kinds are either dropped or,
//! with `show_unsupported`, passed through as `/tag content tag/` so they can
//! be spotted while reviewing a translation.

mod text;

pub use text::{render_inline, render_verse_text};

/// Options for text extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Render unknown node kinds as bracketed tag dumps instead of dropping them.
    pub show_unsupported: bool,
}

//! Open Bible Stories Markdown conversion.
//!
//! One story is one chapter. Its title pseudo-verse becomes the `#` heading,
//! each frame (verse) becomes a paragraph optionally preceded by its frame
//! image, and the reference pseudo-verse becomes a closing `_italic_` line:
//!
//! ```text
//! # 1. The Creation
//!
//! ![OBS Image](https://cdn.door43.org/obs/jpg/360px/obs-en-01-01.jpg)
//!
//! This is how God made everything in the beginning.
//!
//! _A Bible story from: Genesis 1-2_
//! ```
//!
//! - [`render`]: chapter → Markdown
//! - [`parse`]: Markdown → chapter, used for re-import and round-trip checks

mod parse;
mod render;

pub use parse::markdown_to_chapter;
pub(crate) use parse::{image_src, split_blocks};
pub use render::chapter_to_markdown;

/// Default location of the OBS frame illustrations.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://cdn.door43.org/obs/jpg/360px";

/// Where OBS frame images live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsImages {
    pub base_url: String,
    /// Language segment of the image file names.
    pub language: String,
}

impl ObsImages {
    /// URL of the image for `frame` of `story`, e.g. `.../obs-en-01-02.jpg`.
    pub fn frame_url(&self, story: u32, frame: u32) -> String {
        format!(
            "{}/obs-{}-{:02}-{:02}.jpg",
            self.base_url.trim_end_matches('/'),
            self.language,
            story,
            frame
        )
    }
}

impl Default for ObsImages {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            language: "en".to_string(),
        }
    }
}

/// Configuration for Markdown output.
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Emit an image line before every frame.
    pub with_images: bool,
    pub images: ObsImages,
    /// Pass unknown verse object kinds through as `/tag content tag/`.
    pub show_unsupported: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            with_images: true,
            images: ObsImages::default(),
            show_unsupported: false,
        }
    }
}

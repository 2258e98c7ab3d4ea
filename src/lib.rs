//! # scriptura
//!
//! Conversion of parsed scripture markup into downloadable formats.
//!
//! Translated chapters arrive as JSON produced by a USFM tokenizer: for each
//! verse, a tree of verse objects (words, alignment milestones, footnotes,
//! paragraph breaks). This crate turns those trees into:
//!
//! - Plain verse text ([`render`])
//! - Compiled chapters and books as TXT, HTML or a PDF-ready HTML document
//!   ([`compile`])
//! - Open Bible Stories Markdown ([`markdown`])
//! - USFM, and back ([`usfm`])
//! - Named download artifacts and zip archives ([`export`])
//!
//! ## Quick Start
//!
//! ```
//! use scriptura::model::VerseObject;
//! use scriptura::render::render_verse_text;
//!
//! let verse: Vec<VerseObject> = serde_json::from_str(r#"[
//!     {"type": "text", "text": "In the beginning "},
//!     {"type": "word", "text": "God", "strong": "H0430"},
//!     {"type": "text", "text": " created."}
//! ]"#).unwrap();
//!
//! assert_eq!(render_verse_text(&verse, false), "In the beginning God created.");
//! ```
//!
//! ## Downloads
//!
//! ```no_run
//! use scriptura::export::{DownloadFormat, ExportRequest, ExportScope, export};
//! use scriptura::{Book, Project};
//!
//! let project: Project = serde_json::from_str(&std::fs::read_to_string("project.json")?)?;
//! let book: Book = serde_json::from_str(&std::fs::read_to_string("book.json")?)?;
//!
//! let request = ExportRequest::new(&project, &book, DownloadFormat::Txt, ExportScope::Chapter(1));
//! let artifact = export(&request)?;
//! println!("{}", artifact.file_name);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compile;
pub mod error;
pub mod export;
pub mod markdown;
pub mod model;
pub mod render;
pub mod usfm;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use compile::{CompileFormat, CompileOptions, Labels, LayoutOptions, compile_book, compile_chapter};
pub use error::{Error, Result};
pub use export::{DownloadFormat, ExportArtifact, ExportFileNode, ExportRequest, ExportScope, export};
pub use markdown::{MarkdownConfig, chapter_to_markdown, markdown_to_chapter};
pub use model::{Book, Chapter, ChapterText, Project, ProjectType, Verse, VerseObject};
pub use render::{RenderOptions, render_inline, render_verse_text};
pub use usfm::{UsfmConfig, chapters_to_usfm, usfm_to_chapters};

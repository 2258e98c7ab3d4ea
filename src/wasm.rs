//! WASM bindings for in-browser downloads.
//!
//! This module exposes the conversion functions to JavaScript via
//! wasm-bindgen. Inputs and outputs are JSON strings in the same shapes the
//! content store uses.

use wasm_bindgen::prelude::*;

use crate::export::{DownloadFormat, ExportRequest, ExportScope, archive_to_bytes, build_archive};
use crate::markdown::MarkdownConfig;
use crate::model::{Book, ChapterText, Project, VerseObject};
use crate::usfm::UsfmConfig;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Render one verse (a JSON array of verse objects) as plain text.
#[wasm_bindgen]
pub fn verse_text(verse_objects: &str, show_unsupported: bool) -> Result<String, JsValue> {
    let nodes: Vec<VerseObject> = serde_json::from_str(verse_objects).map_err(js_error)?;
    Ok(crate::render::render_verse_text(&nodes, show_unsupported))
}

/// Convert one OBS story (a JSON verse map) to Markdown.
#[wasm_bindgen]
pub fn chapter_to_markdown(chapter_json: &str, story: u32, with_images: bool) -> Result<String, JsValue> {
    let text: ChapterText = serde_json::from_str(chapter_json).map_err(js_error)?;
    let config = MarkdownConfig {
        with_images,
        ..Default::default()
    };
    Ok(crate::markdown::chapter_to_markdown(&text, story, &config))
}

/// Convert a book (JSON with `chapters`) to USFM.
#[wasm_bindgen]
pub fn book_to_usfm(book_json: &str, project_json: &str) -> Result<String, JsValue> {
    let book: Book = serde_json::from_str(book_json).map_err(js_error)?;
    let project: Project = serde_json::from_str(project_json).map_err(js_error)?;
    Ok(crate::usfm::chapters_to_usfm(
        &book.chapters,
        &book,
        &project,
        &UsfmConfig::default(),
    ))
}

/// Parse USFM into a book JSON string.
#[wasm_bindgen]
pub fn usfm_to_book(usfm: &str) -> Result<String, JsValue> {
    let book = crate::usfm::usfm_to_chapters(usfm)
        .map_err(js_error)?
        .into_book();
    serde_json::to_string(&book).map_err(js_error)
}

/// Build the OBS archive for a book and return the zip bytes.
#[wasm_bindgen]
pub fn obs_zip(book_json: &str) -> Result<Vec<u8>, JsValue> {
    let book: Book = serde_json::from_str(book_json).map_err(js_error)?;
    let tree = build_archive(&book, &MarkdownConfig::default()).map_err(js_error)?;
    archive_to_bytes(&tree, &Default::default()).map_err(js_error)
}

/// Download file name for a format (`pdf`, `txt`, `markdown`, `usfm`, `zip`).
///
/// `chapter` of 0 requests the whole book.
#[wasm_bindgen]
pub fn download_file_name(
    format: &str,
    chapter: u32,
    book_json: &str,
    project_json: &str,
) -> Result<String, JsValue> {
    let format: DownloadFormat = format.parse().map_err(js_error)?;
    let book: Book = serde_json::from_str(book_json).map_err(js_error)?;
    let project: Project = serde_json::from_str(project_json).map_err(js_error)?;
    let scope = if chapter == 0 {
        ExportScope::Book
    } else {
        ExportScope::Chapter(chapter)
    };
    Ok(crate::export::download_file_name(format, scope, &project, &book))
}

/// Run a full export and return the payload bytes (HTML for PDF downloads).
#[wasm_bindgen]
pub fn export_bytes(
    format: &str,
    chapter: u32,
    book_json: &str,
    project_json: &str,
) -> Result<Vec<u8>, JsValue> {
    let format: DownloadFormat = format.parse().map_err(js_error)?;
    let book: Book = serde_json::from_str(book_json).map_err(js_error)?;
    let project: Project = serde_json::from_str(project_json).map_err(js_error)?;
    let scope = if chapter == 0 {
        ExportScope::Book
    } else {
        ExportScope::Chapter(chapter)
    };
    let request = ExportRequest::new(&project, &book, format, scope);
    let artifact = crate::export::export(&request).map_err(js_error)?;
    Ok(artifact.into_bytes())
}

//! Download artifacts: file naming, format selection and archive packaging.
//!
//! Provides the `Exporter` trait, the OBS archive tree and its zip
//! serialization, and [`export`], which turns a download request into a
//! named artifact.
//!
//! # Formats
//!
//! | Project   | Chapter          | Book          |
//! |-----------|------------------|---------------|
//! | scripture | PDF, TXT         | PDF, USFM     |
//! | OBS       | PDF, Markdown    | PDF, ZIP      |
//!
//! PDF rendering itself happens outside this crate: a PDF artifact carries
//! the compiled HTML document and the layout switches for the renderer.
//!
//! # Example
//!
//! ```no_run
//! use scriptura::export::{DownloadFormat, ExportRequest, ExportScope, export};
//! use scriptura::model::{Book, Project};
//!
//! let project: Project = serde_json::from_str(&std::fs::read_to_string("project.json")?)?;
//! let book: Book = serde_json::from_str(&std::fs::read_to_string("book.json")?)?;
//!
//! let request = ExportRequest::new(&project, &book, DownloadFormat::Usfm, ExportScope::Book);
//! let artifact = export(&request)?;
//! let file_name = artifact.file_name.clone();
//! std::fs::write(&file_name, artifact.into_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::io::{Cursor, Seek, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compile::{
    ChapterSource, CompileFormat, CompileOptions, FrontPage, Labels, LayoutOptions,
    compile_book, compile_chapter,
};
use crate::error::{Error, Result};
use crate::markdown::{MarkdownConfig, chapter_to_markdown};
use crate::model::{Book, Project, ProjectType};
use crate::render::RenderOptions;
use crate::usfm::{UsfmConfig, chapters_to_usfm};

mod archive;
mod naming;
mod zip_archive;

pub use archive::{ArchiveBuilder, ExportFileNode, ROOT_FOLDER, build_archive, story_file_name};
pub use naming::{DEFAULT_ARCHIVE_NAME, DEFAULT_BOOK_NAME, DEFAULT_OBS_NAME, download_file_name};
pub use zip_archive::{ZipConfig, ZipExporter, archive_to_bytes, serialize_archive};

/// Trait for exporting books to specific formats.
///
/// Exporters use a builder pattern where configuration is held in the struct,
/// and the `export` method writes to any `Write + Seek` destination.
pub trait Exporter {
    /// Export the book to the provided writer.
    fn export<W: Write + Seek>(&self, book: &Book, writer: &mut W) -> Result<()>;
}

/// A downloadable format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    Pdf,
    Txt,
    Markdown,
    Usfm,
    Zip,
}

impl DownloadFormat {
    /// Formats offered for a project type and scope, PDF first.
    pub fn options(project_type: ProjectType, is_book: bool) -> Vec<DownloadFormat> {
        let extra = match (project_type, is_book) {
            (ProjectType::Obs, true) => DownloadFormat::Zip,
            (ProjectType::Obs, false) => DownloadFormat::Markdown,
            (ProjectType::Bible, true) => DownloadFormat::Usfm,
            (ProjectType::Bible, false) => DownloadFormat::Txt,
        };
        vec![DownloadFormat::Pdf, extra]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DownloadFormat::Pdf => "pdf",
            DownloadFormat::Txt => "txt",
            DownloadFormat::Markdown => "markdown",
            DownloadFormat::Usfm => "usfm",
            DownloadFormat::Zip => "zip",
        }
    }

    /// Media type of the final download.
    pub fn media_type(self) -> &'static str {
        match self {
            DownloadFormat::Pdf => "application/pdf",
            DownloadFormat::Txt | DownloadFormat::Usfm => "text/plain",
            DownloadFormat::Markdown => "text/markdown",
            DownloadFormat::Zip => "application/zip",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DownloadFormat::Pdf),
            "txt" | "text" => Ok(DownloadFormat::Txt),
            "markdown" | "md" => Ok(DownloadFormat::Markdown),
            "usfm" => Ok(DownloadFormat::Usfm),
            "zip" => Ok(DownloadFormat::Zip),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// What is being downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Chapter(u32),
    Book,
}

impl ExportScope {
    pub fn is_book(self) -> bool {
        self == ExportScope::Book
    }

    pub fn chapter(self) -> Option<u32> {
        match self {
            ExportScope::Chapter(num) => Some(num),
            ExportScope::Book => None,
        }
    }
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportScope::Chapter(num) => write!(f, "chapter {num}"),
            ExportScope::Book => f.write_str("book"),
        }
    }
}

/// A download request: what to export and how.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub project: &'a Project,
    pub book: &'a Book,
    pub format: DownloadFormat,
    pub scope: ExportScope,
    pub layout: LayoutOptions,
    pub labels: Labels,
    pub render: RenderOptions,
    pub markdown: MarkdownConfig,
    pub usfm: UsfmConfig,
    pub zip: ZipConfig,
}

impl<'a> ExportRequest<'a> {
    /// A request with the default download settings for its scope.
    pub fn new(
        project: &'a Project,
        book: &'a Book,
        format: DownloadFormat,
        scope: ExportScope,
    ) -> Self {
        let layout = if scope.is_book() {
            LayoutOptions::book_defaults()
        } else {
            LayoutOptions::chapter_defaults()
        };
        Self {
            project,
            book,
            format,
            scope,
            layout,
            labels: Labels::default(),
            render: RenderOptions::default(),
            markdown: MarkdownConfig::default(),
            usfm: UsfmConfig::default(),
            zip: ZipConfig::default(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_markdown(mut self, markdown: MarkdownConfig) -> Self {
        self.markdown = markdown;
        self
    }

    fn compile_options(&self, format: CompileFormat) -> CompileOptions {
        CompileOptions {
            format,
            labels: self.labels.clone(),
            layout: self.layout,
            render: self.render,
            front: Some(FrontPage::from_metadata(self.project, self.book)),
            obs: self
                .project
                .is_obs()
                .then(|| self.markdown.images.clone()),
            language: self.project.language.code.clone(),
        }
    }

    fn chapter_label(&self) -> &str {
        self.book.chapter_label().unwrap_or(&self.labels.chapter)
    }
}

/// Artifact content.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPayload {
    Text(String),
    Binary(Vec<u8>),
    /// HTML document and layout for the external PDF renderer.
    Pdf { html: String, layout: LayoutOptions },
}

/// A named download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub media_type: &'static str,
    pub payload: ExportPayload,
}

impl ExportArtifact {
    /// Payload bytes; for PDF artifacts, the HTML document.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.payload {
            ExportPayload::Text(text) => text.into_bytes(),
            ExportPayload::Binary(bytes) => bytes,
            ExportPayload::Pdf { html, .. } => html.into_bytes(),
        }
    }

    /// Text payload, if this artifact has one.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            ExportPayload::Text(text) => Some(text),
            ExportPayload::Pdf { html, .. } => Some(html),
            ExportPayload::Binary(_) => None,
        }
    }
}

/// Produce the artifact for a download request.
///
/// Fails with [`Error::UnsupportedFormat`] when the format is not offered for
/// the project type and scope (see [`DownloadFormat::options`]), and with
/// [`Error::MissingMetadata`] when a USFM export has no book code. A chapter
/// that has not been translated yet exports as empty content.
pub fn export(request: &ExportRequest<'_>) -> Result<ExportArtifact> {
    let ExportRequest {
        project,
        book,
        format,
        scope,
        ..
    } = *request;

    if !DownloadFormat::options(project.project_type, scope.is_book()).contains(&format) {
        let kind = if project.is_obs() { "OBS" } else { "scripture" };
        return Err(Error::UnsupportedFormat(format!(
            "{format} is not offered for a {kind} {scope}"
        )));
    }

    let payload = match (format, scope) {
        (DownloadFormat::Txt, ExportScope::Chapter(num)) => {
            let text = book.chapter(num).and_then(|c| c.text.as_ref());
            let mut title = vec![project.title.as_str()];
            title.extend(book.toc1());
            let heading = format!("{} {num}", request.chapter_label());
            title.push(&heading);
            let subtitle = format!(
                "{} {} {num}",
                book.toc1().unwrap_or(&book.code),
                request.labels.chapter
            );
            let source = ChapterSource::new(num, text)
                .with_title(
                    title
                        .into_iter()
                        .filter(|line| !line.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
                .with_subtitle(subtitle);
            ExportPayload::Text(compile_chapter(
                Some(&source),
                &request.compile_options(CompileFormat::Txt),
            ))
        }
        (DownloadFormat::Markdown, ExportScope::Chapter(num)) => {
            let markdown = book
                .chapter(num)
                .and_then(|c| c.text.as_ref())
                .map(|text| chapter_to_markdown(text, num, &request.markdown))
                .unwrap_or_default();
            ExportPayload::Text(markdown)
        }
        (DownloadFormat::Usfm, _) => {
            if book.code.trim().is_empty() {
                return Err(Error::MissingMetadata("book code".to_string()));
            }
            ExportPayload::Text(chapters_to_usfm(
                &book.chapters,
                book,
                project,
                &request.usfm,
            ))
        }
        (DownloadFormat::Zip, _) => {
            let mut cursor = Cursor::new(Vec::new());
            ZipExporter::new()
                .with_config(request.zip.clone())
                .with_markdown(request.markdown.clone())
                .export(book, &mut cursor)?;
            ExportPayload::Binary(cursor.into_inner())
        }
        (DownloadFormat::Pdf, ExportScope::Chapter(num)) => {
            let text = book.chapter(num).and_then(|c| c.text.as_ref());
            let mut source = ChapterSource::new(num, text);
            if !project.is_obs() {
                source = source.with_title(format!("{} {num}", request.chapter_label()));
            }
            ExportPayload::Pdf {
                html: compile_chapter(Some(&source), &request.compile_options(CompileFormat::Pdf)),
                layout: request.layout,
            }
        }
        (DownloadFormat::Pdf, ExportScope::Book) => ExportPayload::Pdf {
            html: compile_book(book, project, &request.compile_options(CompileFormat::Pdf)),
            layout: request.layout,
        },
        (format, scope) => {
            return Err(Error::UnsupportedFormat(format!("{format} for {scope}")));
        }
    };

    let artifact = ExportArtifact {
        file_name: download_file_name(format, scope, project, book),
        media_type: format.media_type(),
        payload,
    };
    log::debug!(
        "exported {} ({}, {})",
        artifact.file_name,
        format,
        scope
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_options() {
        use DownloadFormat::*;
        assert_eq!(DownloadFormat::options(ProjectType::Obs, true), vec![Pdf, Zip]);
        assert_eq!(DownloadFormat::options(ProjectType::Obs, false), vec![Pdf, Markdown]);
        assert_eq!(DownloadFormat::options(ProjectType::Bible, true), vec![Pdf, Usfm]);
        assert_eq!(DownloadFormat::options(ProjectType::Bible, false), vec![Pdf, Txt]);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("MD".parse::<DownloadFormat>().unwrap(), DownloadFormat::Markdown);
        assert!(matches!(
            "epub".parse::<DownloadFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_unoffered_format_is_rejected() {
        let project = Project::new("ult", "Literal");
        let book = Book::new("gen");
        let request = ExportRequest::new(&project, &book, DownloadFormat::Zip, ExportScope::Book);
        assert!(matches!(export(&request), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_usfm_requires_book_code() {
        let project = Project::new("ult", "Literal");
        let book = Book::new("");
        let request = ExportRequest::new(&project, &book, DownloadFormat::Usfm, ExportScope::Book);
        assert!(matches!(export(&request), Err(Error::MissingMetadata(_))));
    }
}

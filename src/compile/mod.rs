//! Chapter and book compilation for TXT downloads and the PDF renderer.
//!
//! A compiled chapter is a title block followed by one entry per translated
//! verse, each prefixed with its verse number. The title (0) and reference
//! (200) pseudo-verses use the caller's localized [`Labels`] instead.
//!
//! Untranslated verses are skipped, and an absent chapter compiles to an
//! empty string so a reader can request chapters that nobody has started.

mod html;

pub use html::{escape_html, html_document, markdown_to_html};

use std::fmt::Write;

use html::BlockWriter;

use crate::markdown::ObsImages;
use crate::model::{Book, ChapterText, Project, REFERENCE_VERSE, TITLE_VERSE, Verse};
use crate::render::{RenderOptions, render_verse_text};

/// Output flavor of a compiled chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompileFormat {
    /// Plain text, one line per verse.
    #[default]
    Txt,
    /// HTML fragment.
    Html,
    /// Standalone HTML document for the PDF renderer.
    Pdf,
}

/// Localized labels supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Label for the title pseudo-verse (0).
    pub title: String,
    /// Label for the reference pseudo-verse (200).
    pub reference: String,
    /// Word for "chapter" when the book has no `chapter_label`.
    pub chapter: String,
}

impl Labels {
    pub fn new(
        title: impl Into<String>,
        reference: impl Into<String>,
        chapter: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            reference: reference.into(),
            chapter: chapter.into(),
        }
    }

    /// Label printed before a verse.
    pub fn verse_label(&self, num: u32) -> String {
        match num {
            TITLE_VERSE => self.title.clone(),
            REFERENCE_VERSE => self.reference.clone(),
            n => n.to_string(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new("Title", "Reference", "Chapter")
    }
}

/// Download layout switches, forwarded to the PDF renderer as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Insert OBS frame images.
    pub with_images: bool,
    /// Prefix a title page.
    pub with_front: bool,
    /// Include the OBS front intro (book scope).
    pub with_intro: bool,
    /// Include the OBS back matter (book scope).
    pub with_back: bool,
}

impl LayoutOptions {
    /// Defaults offered when downloading one chapter.
    pub fn chapter_defaults() -> Self {
        Self {
            with_images: true,
            with_front: true,
            with_intro: false,
            with_back: false,
        }
    }

    /// Defaults offered when downloading a whole book.
    pub fn book_defaults() -> Self {
        Self {
            with_intro: true,
            with_back: true,
            ..Self::chapter_defaults()
        }
    }
}

/// Content of the title page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontPage {
    pub project_title: String,
    pub book_title: String,
    pub language: String,
}

impl FrontPage {
    pub fn from_metadata(project: &Project, book: &Book) -> Self {
        Self {
            project_title: project.title.clone(),
            book_title: book.title().unwrap_or(&book.code).to_string(),
            language: project.language.orig_name.clone(),
        }
    }

    fn write_html(&self, blocks: &mut BlockWriter) {
        blocks.raw_block("<div class=\"front-page\">");
        blocks.heading(1, "project-title", &self.project_title);
        blocks.heading(2, "book-title", &self.book_title);
        if !self.language.is_empty() {
            blocks.raw_block(&format!(
                "<p class=\"language\">{}</p>",
                escape_html(&self.language)
            ));
        }
        blocks.raw_block("</div>");
    }
}

/// Configuration for chapter and book compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub format: CompileFormat,
    pub labels: Labels,
    pub layout: LayoutOptions,
    pub render: RenderOptions,
    /// Title page content; used when `layout.with_front` is set.
    pub front: Option<FrontPage>,
    /// Set for Open Bible Stories: every verse is a frame paragraph, with an
    /// image when `layout.with_images` is set.
    pub obs: Option<ObsImages>,
    /// Document language for the PDF wrapper.
    pub language: String,
}

/// One chapter as requested for compilation.
#[derive(Debug, Clone, Default)]
pub struct ChapterSource<'a> {
    /// Verse data; `None` when the chapter has not been translated yet.
    pub text: Option<&'a ChapterText>,
    pub num: u32,
    /// Title block, possibly several lines.
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

impl<'a> ChapterSource<'a> {
    pub fn new(num: u32, text: Option<&'a ChapterText>) -> Self {
        Self {
            text,
            num,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Compile one chapter.
///
/// Returns an empty string when `chapter` or its text is absent.
pub fn compile_chapter(chapter: Option<&ChapterSource<'_>>, options: &CompileOptions) -> String {
    let Some(chapter) = chapter else {
        return String::new();
    };
    let Some(text) = chapter.text else {
        log::debug!("chapter {} has no text, compiling to empty output", chapter.num);
        return String::new();
    };

    match options.format {
        CompileFormat::Txt => compile_txt(chapter, text, options),
        CompileFormat::Html | CompileFormat::Pdf => {
            let mut blocks = BlockWriter::new();
            if options.layout.with_front
                && let Some(front) = &options.front
            {
                front.write_html(&mut blocks);
            }
            write_chapter_html(&mut blocks, chapter, text, options);
            let body = blocks.finish();
            if options.format == CompileFormat::Pdf {
                let title = chapter
                    .title
                    .as_deref()
                    .and_then(|t| t.lines().next())
                    .unwrap_or_default();
                html_document(title, &options.language, &body)
            } else {
                body
            }
        }
    }
}

fn compile_txt(chapter: &ChapterSource<'_>, text: &ChapterText, options: &CompileOptions) -> String {
    let mut out = String::new();
    let title = chapter.title.as_deref().filter(|t| !t.trim().is_empty());
    let subtitle = chapter.subtitle.as_deref().filter(|t| !t.trim().is_empty());
    for line in [title, subtitle].into_iter().flatten() {
        out.push_str(line.trim());
        out.push('\n');
    }
    if !out.is_empty() {
        out.push('\n');
    }
    for (verse, body) in rendered_verses(text, options) {
        if body.breaks_before && !out.is_empty() && !out.ends_with("\n\n") {
            out.push('\n');
        }
        out.push_str(&options.labels.verse_label(verse.num));
        if !body.text.is_empty() {
            out.push(' ');
            out.push_str(&body.text);
        }
        out.push('\n');
        if body.breaks_after {
            out.push('\n');
        }
    }
    out
}

/// Rendered text of one verse, with paragraph breaks at either edge kept
/// apart from the text itself.
struct VerseBody {
    text: String,
    breaks_before: bool,
    breaks_after: bool,
}

impl VerseBody {
    fn new(rendered: &str) -> Self {
        let inline = |c: char| c == ' ' || c == '\t' || c == '\r';
        let trimmed = rendered.trim_matches(inline);
        let text = trimmed.trim_matches(|c: char| c == '\n' || inline(c));
        Self {
            breaks_before: trimmed.starts_with('\n') && !text.is_empty(),
            breaks_after: trimmed.ends_with('\n'),
            text: text.to_string(),
        }
    }
}

/// Translated verses paired with their rendered text.
fn rendered_verses<'t>(
    text: &'t ChapterText,
    options: &CompileOptions,
) -> impl Iterator<Item = (&'t Verse, VerseBody)> {
    let show_unsupported = options.render.show_unsupported;
    text.verses().iter().filter_map(move |verse| {
        let objects = verse.verse_objects.as_ref()?;
        let body = render_verse_text(objects, show_unsupported);
        Some((verse, VerseBody::new(&body)))
    })
}

fn write_chapter_html(
    blocks: &mut BlockWriter,
    chapter: &ChapterSource<'_>,
    text: &ChapterText,
    options: &CompileOptions,
) {
    blocks.raw_block(&format!(
        "<div class=\"chapter\" id=\"chapter-{}\">",
        chapter.num
    ));
    if let Some(title) = chapter.title.as_deref().filter(|t| !t.trim().is_empty()) {
        blocks.heading(1, "title", title.trim());
    }
    if let Some(subtitle) = chapter.subtitle.as_deref().filter(|t| !t.trim().is_empty()) {
        blocks.heading(2, "subtitle", subtitle.trim());
    }

    for (verse, body) in rendered_verses(text, options) {
        match verse.num {
            TITLE_VERSE => {
                blocks.close_paragraph();
                blocks.open_paragraph(Some("verse-title"));
                blocks.label("verse-label", &options.labels.title);
                blocks.text(&body.text);
                blocks.close_paragraph();
            }
            REFERENCE_VERSE => {
                blocks.close_paragraph();
                blocks.open_paragraph(Some("reference"));
                blocks.label("verse-label", &options.labels.reference);
                blocks.text(&body.text);
                blocks.close_paragraph();
            }
            num => {
                if let Some(images) = &options.obs {
                    blocks.close_paragraph();
                    if options.layout.with_images {
                        blocks.image(&images.frame_url(chapter.num, num));
                    }
                }
                if body.breaks_before {
                    blocks.close_paragraph();
                }
                blocks.label("verse-num", &num.to_string());
                blocks.text(&body.text);
                if body.breaks_after || options.obs.is_some() {
                    blocks.close_paragraph();
                }
            }
        }
    }
    blocks.raw_block("</div>");
}

/// Compile every translated chapter of a book into one output.
///
/// Scripture chapters get a `"{chapter_label} {num}"` heading; OBS stories
/// rely on their title pseudo-verse. For HTML and PDF the title page, OBS
/// intro and OBS back matter follow `options.layout`.
pub fn compile_book(book: &Book, project: &Project, options: &CompileOptions) -> String {
    let chapter_label = book
        .chapter_label()
        .unwrap_or(&options.labels.chapter)
        .to_string();

    let chapters = book.chapters.iter().filter_map(|chapter| {
        let Some(text) = chapter.text.as_ref() else {
            log::debug!("skipping untranslated chapter {}", chapter.num);
            return None;
        };
        let mut source = ChapterSource::new(chapter.num, Some(text));
        if !project.is_obs() {
            source.title = Some(format!("{chapter_label} {}", chapter.num));
        }
        Some((source, text))
    });

    match options.format {
        CompileFormat::Txt => {
            let mut out = String::new();
            if let Some(title) = book.title() {
                let _ = writeln!(out, "{}\n{title}\n", project.title);
            }
            for (source, text) in chapters {
                out.push_str(&compile_txt(&source, text, options));
                if !out.ends_with("\n\n") {
                    out.push('\n');
                }
            }
            out
        }
        CompileFormat::Html | CompileFormat::Pdf => {
            let mut blocks = BlockWriter::new();
            if options.layout.with_front {
                let front = options
                    .front
                    .clone()
                    .unwrap_or_else(|| FrontPage::from_metadata(project, book));
                front.write_html(&mut blocks);
            }
            if options.layout.with_intro
                && let Some(intro) = book.obs_intro()
            {
                blocks.raw_block("<div class=\"intro\">");
                blocks.raw_block(&markdown_to_html(intro));
                blocks.raw_block("</div>");
            }
            for (source, text) in chapters {
                write_chapter_html(&mut blocks, &source, text, options);
            }
            if options.layout.with_back
                && let Some(back) = book.obs_back()
            {
                blocks.raw_block("<div class=\"back\">");
                blocks.raw_block(&markdown_to_html(back));
                blocks.raw_block("</div>");
            }
            let body = blocks.finish();
            if options.format == CompileFormat::Pdf {
                let title = book.title().unwrap_or(&project.title);
                let language = if options.language.is_empty() {
                    &project.language.code
                } else {
                    &options.language
                };
                html_document(title, language, &body)
            } else {
                body
            }
        }
    }
}

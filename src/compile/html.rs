//! HTML building blocks for compiled chapters and books.
//!
//! The output is consumed by an external PDF renderer, so it stays plain:
//! block elements for paragraphs and headings, a few classes for styling.

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::markdown::{image_src, split_blocks};

/// Minimal print stylesheet embedded in PDF documents.
const PRINT_CSS: &str = "\
body { font-family: serif; line-height: 1.5; }
.front-page, .intro, .back { page-break-after: always; }
.chapter { page-break-before: always; }
.chapter:first-child { page-break-before: auto; }
.front-page { text-align: center; padding-top: 30%; }
.verse-num, .verse-label { font-size: 0.7em; vertical-align: super; margin-right: 0.2em; }
.frame { display: block; max-width: 100%; margin: 1em auto; }
.reference { font-style: italic; }
";

/// Escape text for element content and attribute values.
pub fn escape_html(text: &str) -> String {
    escape(text).into_owned()
}

/// Accumulates block-level HTML, opening and closing `<p>` as text arrives.
#[derive(Debug, Default)]
pub(crate) struct BlockWriter {
    out: String,
    in_paragraph: bool,
    /// The open paragraph already holds a label or text.
    has_content: bool,
}

impl BlockWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a paragraph with the given class unless one is already open.
    pub fn open_paragraph(&mut self, class: Option<&str>) {
        if self.in_paragraph {
            return;
        }
        match class {
            Some(class) => {
                let _ = write!(self.out, "<p class=\"{class}\">");
            }
            None => self.out.push_str("<p>"),
        }
        self.in_paragraph = true;
        self.has_content = false;
    }

    pub fn close_paragraph(&mut self) {
        if self.in_paragraph {
            self.out.push_str("</p>\n");
            self.in_paragraph = false;
        }
    }

    /// Write a superscript label inside the current paragraph, separated by
    /// a space from whatever precedes it there.
    pub fn label(&mut self, class: &str, label: &str) {
        self.open_paragraph(None);
        if self.has_content {
            self.out.push(' ');
        }
        self.has_content = true;
        let _ = write!(
            self.out,
            "<sup class=\"{class}\">{}</sup> ",
            escape_html(label)
        );
    }

    /// Write inline text; each `\n` is a paragraph boundary.
    pub fn text(&mut self, text: &str) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.close_paragraph();
            }
            if segment.trim().is_empty() {
                continue;
            }
            self.open_paragraph(None);
            self.out.push_str(&escape_html(segment));
            self.has_content = true;
        }
    }

    /// Write a block element outside any paragraph.
    pub fn raw_block(&mut self, html: &str) {
        self.close_paragraph();
        self.out.push_str(html);
        if !html.ends_with('\n') {
            self.out.push('\n');
        }
    }

    pub fn heading(&mut self, level: u8, class: &str, text: &str) {
        let lines: Vec<String> = text.lines().map(escape_html).collect();
        self.raw_block(&format!(
            "<h{level} class=\"{class}\">{}</h{level}>",
            lines.join("<br/>")
        ));
    }

    pub fn image(&mut self, src: &str) {
        self.raw_block(&format!(
            "<img class=\"frame\" src=\"{}\" alt=\"\"/>",
            escape_html(src)
        ));
    }

    pub fn finish(mut self) -> String {
        self.close_paragraph();
        self.out
    }
}

/// Render a small Markdown document (front/back matter) as HTML blocks.
///
/// Supports ATX headings, image lines and paragraphs separated by blank
/// lines, which is what translators write in those fields.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut blocks = BlockWriter::new();
    for block in split_blocks(markdown) {
        let first = block[0].trim_start();
        let hashes = first.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&hashes) && first[hashes..].starts_with(' ') {
            blocks.heading(hashes as u8, "heading", first[hashes..].trim());
            let rest = block[1..].join(" ");
            if !rest.trim().is_empty() {
                blocks.text(rest.trim());
                blocks.close_paragraph();
            }
        } else if let Some(src) = image_src(first) {
            blocks.image(src);
        } else {
            let joined: Vec<&str> = block.iter().map(|l| l.trim()).collect();
            blocks.text(&joined.join(" "));
            blocks.close_paragraph();
        }
    }
    blocks.finish()
}

/// Wrap body HTML in a standalone document for the PDF renderer.
pub fn html_document(title: &str, language: &str, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 512);
    doc.push_str("<!DOCTYPE html>\n");
    if language.is_empty() {
        doc.push_str("<html>\n");
    } else {
        let _ = writeln!(doc, "<html lang=\"{}\">", escape_html(language));
    }
    doc.push_str("<head>\n<meta charset=\"utf-8\"/>\n");
    let _ = writeln!(doc, "<title>{}</title>", escape_html(title));
    let _ = writeln!(doc, "<style>\n{PRINT_CSS}</style>");
    doc.push_str("</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("</body>\n</html>\n");
    doc
}

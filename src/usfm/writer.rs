//! Chapters → USFM.
//!
//! Structure is re-escaped into USFM markers rather than flattened, so the
//! output can be imported again. Lossy steps:
//! - footnote bodies are written back verbatim, whatever markers they contain
//! - unsupported nodes keep their opening marker and text but no end marker
//! - `nextChar` on text nodes is only used when `text` is absent

use std::fmt::Write;

use crate::model::{
    Attributes, Book, Chapter, Project, REFERENCE_VERSE, TITLE_VERSE, VerseObject, canon,
    non_empty,
};
use crate::render::render_verse_text;

use super::UsfmConfig;

/// Attribute names written without the `x-` prefix on `\w` words.
const WORD_ATTRIBUTES: &[&str] = &["strong", "lemma", "srcloc", "gloss", "link-href"];

/// Preferred attribute order; anything else follows alphabetically.
const ATTRIBUTE_ORDER: &[&str] = &[
    "strong",
    "lemma",
    "morph",
    "occurrence",
    "occurrences",
    "content",
];

/// Serialize a book's chapters as one USFM document.
///
/// Chapters without text, or whose verses are all untranslated, are left
/// out entirely, as are untranslated verses.
pub fn chapters_to_usfm(
    chapters: &[Chapter],
    book: &Book,
    project: &Project,
    config: &UsfmConfig,
) -> String {
    let mut out = String::new();
    write_header(&mut out, book, project, config);

    for chapter in chapters {
        let Some(text) = chapter.text.as_ref().filter(|t| t.has_translation()) else {
            log::debug!("skipping untranslated chapter {}", chapter.num);
            continue;
        };

        let _ = write!(out, "\n\\c {}\n", chapter.num);
        if let Some(objects) = text.verse(TITLE_VERSE).and_then(|v| v.verse_objects.as_ref()) {
            let title = plain_line(&render_verse_text(objects, false));
            if !title.is_empty() {
                let _ = writeln!(out, "\\d {title}");
            }
        }
        out.push_str("\\p\n");

        for verse in text.verses().iter().filter(|v| !v.is_pseudo()) {
            let Some(objects) = &verse.verse_objects else {
                log::debug!("skipping untranslated verse {}:{}", chapter.num, verse.num);
                continue;
            };
            let _ = write!(out, "\\v {} ", verse.num);
            for node in objects {
                write_node(&mut out, node);
            }
            end_line(&mut out);
        }

        if let Some(objects) = text
            .verse(REFERENCE_VERSE)
            .and_then(|v| v.verse_objects.as_ref())
        {
            let reference = plain_line(&render_verse_text(objects, false));
            if !reference.is_empty() {
                let _ = writeln!(out, "\\r {reference}");
            }
        }
    }

    out
}

fn write_header(out: &mut String, book: &Book, project: &Project, config: &UsfmConfig) {
    let book_id = canon::lookup(&book.code)
        .map(|b| b.usfm_id())
        .unwrap_or_else(|| book.code.to_ascii_uppercase());

    let language = &project.language;
    let resource = match (language.code.is_empty(), project.code.is_empty()) {
        (false, false) => format!("{}_{}", language.code, project.code),
        (false, true) => language.code.clone(),
        (true, false) => project.code.clone(),
        (true, true) => String::new(),
    };
    let description: Vec<&str> = [
        resource.as_str(),
        language.orig_name.as_str(),
        project.title.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();

    out.push_str("\\id ");
    out.push_str(&book_id);
    if !description.is_empty() {
        out.push(' ');
        out.push_str(&description.join(" "));
    }
    out.push('\n');
    let _ = writeln!(out, "\\usfm {}", config.usfm_version);
    out.push_str("\\ide UTF-8\n");

    let scripture = book.scripture();
    let toc1 = book.toc1();
    let h = scripture.and_then(|s| non_empty(&s.h)).or(toc1);
    let mt = scripture.and_then(|s| non_empty(&s.mt)).or(toc1);
    let lines = [
        ("h", h),
        ("toc1", toc1),
        ("toc2", scripture.and_then(|s| non_empty(&s.toc2))),
        ("toc3", scripture.and_then(|s| non_empty(&s.toc3))),
        ("mt", mt),
        ("cl", book.chapter_label()),
    ];
    for (marker, value) in lines {
        if let Some(value) = value {
            let _ = writeln!(out, "\\{marker} {}", value.trim());
        }
    }
}

/// Append one verse object as USFM.
pub fn write_node(out: &mut String, node: &VerseObject) {
    match node {
        VerseObject::Text { text, next_char } => {
            let text = text
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(next_char.as_deref());
            out.push_str(text.unwrap_or_default());
        }
        VerseObject::Quote {
            tag,
            text,
            next_char,
        } => {
            end_line(out);
            let _ = write!(out, "\\{} ", tag.as_deref().unwrap_or("q1"));
            let text = text
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(next_char.as_deref());
            out.push_str(text.unwrap_or_default().trim_start());
        }
        VerseObject::Word {
            text,
            content,
            strong,
            attributes,
            ..
        } => {
            let surface = text
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(content.as_deref())
                .unwrap_or_default();
            out.push_str("\\w ");
            out.push_str(surface);
            let mut attributes = attributes.clone();
            if let Some(strong) = strong {
                attributes.insert("strong".to_string(), strong.clone());
            }
            if !attributes.is_empty() {
                out.push('|');
                write_attributes(out, &attributes, true);
            }
            out.push_str("\\w*");
        }
        VerseObject::Milestone {
            tag,
            children,
            attributes,
        } => {
            let _ = write!(out, "\\{tag}-s");
            if !attributes.is_empty() {
                out.push_str(" |");
                write_attributes(out, attributes, false);
            }
            out.push_str("\\*");
            for child in children {
                write_node(out, child);
            }
            let _ = write!(out, "\\{tag}-e\\*");
        }
        VerseObject::Section { tag, content } => {
            end_line(out);
            let _ = writeln!(
                out,
                "\\{} {}",
                tag.as_deref().unwrap_or("s1"),
                content.as_deref().unwrap_or_default().trim()
            );
        }
        VerseObject::Paragraph { tag } => {
            end_line(out);
            let _ = writeln!(out, "\\{}", tag.as_deref().unwrap_or("p"));
        }
        VerseObject::Footnote { tag, content } => {
            let tag = tag.as_deref().unwrap_or("f");
            let _ = write!(
                out,
                "\\{tag} {}\\{tag}*",
                content.as_deref().unwrap_or_default().trim()
            );
        }
        VerseObject::Unsupported {
            tag, text, content, ..
        } => {
            let body = content
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(text.as_deref())
                .unwrap_or_default();
            match tag {
                Some(tag) => {
                    let _ = write!(out, "\\{tag} {body}");
                }
                None => out.push_str(body),
            }
        }
    }
}

fn write_attributes(out: &mut String, attributes: &Attributes, is_word: bool) {
    let mut entries: Vec<(&String, &String)> = attributes.iter().collect();
    entries.sort_by_key(|(key, _)| {
        let rank = ATTRIBUTE_ORDER
            .iter()
            .position(|k| k == key)
            .unwrap_or(ATTRIBUTE_ORDER.len());
        (rank, key.as_str())
    });

    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let plain = key.starts_with("x-") || (is_word && WORD_ATTRIBUTES.contains(&key.as_str()));
        if !plain {
            out.push_str("x-");
        }
        let _ = write!(out, "{key}=\"{}\"", value.replace('"', "'"));
    }
}

/// Terminate the current line unless already at a line start.
fn end_line(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    if !out.ends_with('\n') {
        out.push('\n');
    }
}

fn plain_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

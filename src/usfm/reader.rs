//! USFM → chapters.
//!
//! A small tokenizer splits the source into markers and text runs; the
//! parser then folds those tokens into verse object trees, keeping a stack
//! of open milestones so `\zaln-s ... \zaln-e\*` nests the way the writer
//! emits it.
//!
//! Headings and other nodes between `\c` and the first `\v` of a chapter
//! are held back and become the start of that first verse. A bare paragraph
//! marker with nothing before it is dropped, since every verse starts a new
//! line anyway.

use std::collections::BTreeMap;
use std::iter::Peekable;

use memchr::memchr;

use crate::error::{Error, Result};
use crate::model::{
    Attributes, Book, Chapter, ChapterText, REFERENCE_VERSE, ScriptureProperties, TITLE_VERSE,
    Verse, VerseObject,
};

/// Header markers read before the first chapter (`\id`, `\h`, `\toc1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsfmHeader {
    /// First word of `\id`, as written (usually upper case).
    pub book_code: Option<String>,
    pub markers: BTreeMap<String, String>,
}

impl UsfmHeader {
    pub fn get(&self, marker: &str) -> Option<&str> {
        self.markers.get(marker).map(String::as_str)
    }
}

/// A parsed USFM book.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsfmDocument {
    pub header: UsfmHeader,
    pub chapters: Vec<Chapter>,
}

impl UsfmDocument {
    /// Convert into a [`Book`], taking titles from the header markers.
    pub fn into_book(self) -> Book {
        let header = &self.header;
        let owned = |marker: &str| header.get(marker).map(str::to_string);
        let scripture = ScriptureProperties {
            h: owned("h"),
            toc1: owned("toc1"),
            toc2: owned("toc2"),
            toc3: owned("toc3"),
            mt: owned("mt").or_else(|| owned("mt1")),
            chapter_label: owned("cl"),
        };
        let code = header
            .book_code
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Book::new(code)
            .with_scripture(scripture)
            .with_chapters(self.chapters)
    }
}

/// Parse a USFM document into its header and chapters.
///
/// Fails on a verse before the first chapter, a non-numeric chapter or verse
/// number, and duplicate chapter numbers. Everything else is tolerated:
/// unknown markers become unsupported nodes and stray end markers are
/// skipped.
pub fn usfm_to_chapters(usfm: &str) -> Result<UsfmDocument> {
    let mut parser = Parser::new(usfm);
    parser.run()?;
    parser.finish_chapter()?;
    Ok(UsfmDocument {
        header: parser.header,
        chapters: parser.chapters,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// `\name` (a leading `+` for nested character styles is dropped).
    Marker(&'a str),
    /// `\name*`
    EndMarker(&'a str),
    /// `\*`, closing a milestone's attribute list.
    AttrEnd,
    Text(&'a str),
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.src[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if !rest.starts_with('\\') {
            let end = memchr(b'\\', rest.as_bytes()).unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Text(&rest[..end]));
        }

        let name_len = rest[1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '+'))
            .unwrap_or(rest.len() - 1);
        let name = &rest[1..1 + name_len];
        let after = &rest[1 + name_len..];

        if after.starts_with('*') {
            self.pos += name_len + 2;
            return Some(if name.is_empty() {
                Token::AttrEnd
            } else {
                Token::EndMarker(name.trim_start_matches('+'))
            });
        }

        if name.is_empty() {
            self.pos += 1;
            return Some(Token::Text("\\"));
        }

        // One whitespace character separates a marker from its text.
        let gap = if after.starts_with("\r\n") {
            2
        } else if after.starts_with([' ', '\t', '\n', '\r']) {
            1
        } else {
            0
        };
        self.pos += 1 + name_len + gap;
        Some(Token::Marker(name.trim_start_matches('+')))
    }
}

struct OpenMilestone {
    tag: String,
    attributes: Attributes,
    children: Vec<VerseObject>,
}

struct Parser<'a> {
    tokens: Peekable<Lexer<'a>>,
    header: UsfmHeader,
    chapters: Vec<Chapter>,
    chapter: Option<(u32, ChapterText)>,
    verse: Option<(u32, Vec<VerseObject>)>,
    /// Nodes seen in a chapter before its next verse.
    pending: Vec<VerseObject>,
    milestones: Vec<OpenMilestone>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            tokens: Lexer::new(src).peekable(),
            header: UsfmHeader::default(),
            chapters: Vec::new(),
            chapter: None,
            verse: None,
            pending: Vec::new(),
            milestones: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        while let Some(token) = self.tokens.next() {
            match token {
                Token::Marker(name) => self.marker(name)?,
                Token::Text(text) => self.text(text),
                Token::EndMarker(name) => log::debug!("ignoring stray end marker \\{name}*"),
                Token::AttrEnd => log::debug!("ignoring stray \\*"),
            }
        }
        Ok(())
    }

    fn marker(&mut self, name: &str) -> Result<()> {
        match name {
            "c" => {
                self.finish_chapter()?;
                let arg = self.line_text();
                let num = parse_number(&arg)
                    .ok_or_else(|| Error::InvalidUsfm(format!("invalid chapter number {arg:?}")))?;
                self.chapter = Some((num, ChapterText::new()));
            }
            "v" => {
                if self.chapter.is_none() {
                    return Err(Error::InvalidUsfm("verse before first chapter".to_string()));
                }
                self.finish_verse();
                let arg = self.take_text().unwrap_or_default();
                let (num, rest) = arg
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .unwrap_or((arg.trim(), ""));
                let num = parse_number(num)
                    .ok_or_else(|| Error::InvalidUsfm(format!("invalid verse number {num:?}")))?;
                self.verse = Some((num, std::mem::take(&mut self.pending)));
                if !rest.is_empty() {
                    self.text(rest);
                }
            }
            "d" => self.pseudo_verse(TITLE_VERSE),
            "r" => self.pseudo_verse(REFERENCE_VERSE),
            "w" => {
                let raw = self.collect_until("w");
                self.push(parse_word(&raw));
            }
            "f" | "fe" | "x" => {
                let raw = self.collect_until(name);
                self.push(VerseObject::Footnote {
                    tag: Some(name.to_string()),
                    content: Some(raw.trim().to_string()),
                });
            }
            _ if name.ends_with("-s") => {
                let tag = &name[..name.len() - 2];
                let raw = self.collect_until_attr_end();
                let attributes = raw
                    .split_once('|')
                    .map(|(_, attrs)| parse_attributes(attrs))
                    .unwrap_or_default();
                self.milestones.push(OpenMilestone {
                    tag: tag.to_string(),
                    attributes,
                    children: Vec::new(),
                });
            }
            _ if name.ends_with("-e") => {
                if self.tokens.peek() == Some(&Token::AttrEnd) {
                    self.tokens.next();
                }
                self.close_milestone(&name[..name.len() - 2]);
            }
            _ if is_header_marker(name) && self.chapter.is_none() => {
                let value = self.line_text();
                if name == "id" {
                    self.header.book_code = value.split_whitespace().next().map(str::to_string);
                }
                self.header.markers.insert(name.to_string(), value);
            }
            _ if is_quote_marker(name) => {
                let text = self.take_text().unwrap_or_default();
                let node = if text.trim().is_empty() {
                    VerseObject::Paragraph {
                        tag: Some(name.to_string()),
                    }
                } else {
                    VerseObject::Quote {
                        tag: Some(name.to_string()),
                        text: Some(flatten_lines(&text)),
                        next_char: None,
                    }
                };
                self.push(node);
            }
            _ if is_paragraph_marker(name) => self.push(VerseObject::Paragraph {
                tag: Some(name.to_string()),
            }),
            _ if is_section_marker(name) => {
                let content = self.line_text();
                self.push(VerseObject::Section {
                    tag: Some(name.to_string()),
                    content: Some(content),
                });
            }
            _ => {
                let content = self.take_text().map(|t| flatten_lines(&t));
                self.push(VerseObject::Unsupported {
                    kind: "unsupported".to_string(),
                    tag: Some(name.to_string()),
                    text: None,
                    content,
                });
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        let text = flatten_lines(text);
        if self.verse.is_none() && self.milestones.is_empty() && text.trim().is_empty() {
            return;
        }
        self.push(VerseObject::text(text));
    }

    fn push(&mut self, node: VerseObject) {
        if let Some(open) = self.milestones.last_mut() {
            open.children.push(node);
        } else if let Some((_, objects)) = &mut self.verse {
            objects.push(node);
        } else if self.chapter.is_none() {
            log::debug!("dropping {} node before first chapter", node.kind());
        } else if self.pending.is_empty() && node.is_paragraph() {
            log::trace!("skipping leading paragraph marker");
        } else {
            self.pending.push(node);
        }
    }

    fn close_milestone(&mut self, tag: &str) {
        let Some(index) = self.milestones.iter().rposition(|m| m.tag == tag) else {
            log::debug!("ignoring unmatched \\{tag}-e");
            return;
        };
        while self.milestones.len() > index {
            if let Some(open) = self.milestones.pop() {
                if open.tag != tag {
                    log::warn!("closing unterminated \\{}-s inside \\{tag}", open.tag);
                }
                self.push(VerseObject::Milestone {
                    tag: open.tag,
                    children: open.children,
                    attributes: open.attributes,
                });
            }
        }
    }

    fn pseudo_verse(&mut self, num: u32) {
        self.finish_verse();
        let text = self.line_text();
        match &mut self.chapter {
            Some((_, chapter)) if !text.is_empty() => chapter.insert(Verse::plain(num, text)),
            Some(_) => {}
            None => log::debug!("dropping pseudo-verse {num} before first chapter"),
        }
    }

    fn finish_verse(&mut self) {
        while let Some(open) = self.milestones.last() {
            let tag = open.tag.clone();
            log::warn!("unterminated \\{tag}-s at end of verse");
            self.close_milestone(&tag);
        }
        let Some((num, mut objects)) = self.verse.take() else {
            return;
        };
        trim_trailing_space(&mut objects);
        if let Some((_, chapter)) = &mut self.chapter {
            chapter.insert(Verse::new(num, objects));
        }
    }

    fn finish_chapter(&mut self) -> Result<()> {
        self.finish_verse();
        let Some((num, text)) = self.chapter.take() else {
            return Ok(());
        };
        if !self.pending.is_empty() {
            log::debug!(
                "dropping {} nodes after the last verse of chapter {num}",
                self.pending.len()
            );
            self.pending.clear();
        }
        if self.chapters.iter().any(|c| c.num == num) {
            return Err(Error::DuplicateChapter(num));
        }
        self.chapters.push(Chapter::new(num, text));
        Ok(())
    }

    fn take_text(&mut self) -> Option<&'a str> {
        match self.tokens.peek() {
            Some(Token::Text(text)) => {
                let text = *text;
                self.tokens.next();
                Some(text)
            }
            _ => None,
        }
    }

    /// Text following a marker up to the end of its line; the remainder of
    /// the run, if any, is treated as ordinary text.
    fn line_text(&mut self) -> String {
        let Some(text) = self.take_text() else {
            return String::new();
        };
        match text.split_once('\n') {
            Some((line, rest)) => {
                let line = line.trim().to_string();
                if !rest.trim().is_empty() {
                    self.text(rest);
                }
                line
            }
            None => text.trim().to_string(),
        }
    }

    /// Raw source up to `\name*`, re-serializing any inner markers.
    fn collect_until(&mut self, name: &str) -> String {
        let mut raw = String::new();
        for token in self.tokens.by_ref() {
            match token {
                Token::EndMarker(end) if end == name => break,
                Token::Marker(inner) => {
                    raw.push('\\');
                    raw.push_str(inner);
                    raw.push(' ');
                }
                Token::EndMarker(inner) => {
                    raw.push('\\');
                    raw.push_str(inner);
                    raw.push('*');
                }
                Token::AttrEnd => raw.push_str("\\*"),
                Token::Text(text) => raw.push_str(text),
            }
        }
        raw
    }

    fn collect_until_attr_end(&mut self) -> String {
        let mut raw = String::new();
        while let Some(Token::Text(text)) = self.tokens.peek() {
            raw.push_str(text);
            self.tokens.next();
        }
        if self.tokens.peek() == Some(&Token::AttrEnd) {
            self.tokens.next();
        }
        raw
    }
}

fn parse_word(raw: &str) -> VerseObject {
    let (text, attrs) = match raw.rsplit_once('|') {
        Some((text, attrs)) => (text, parse_attributes(attrs)),
        None => (raw, Attributes::new()),
    };
    let mut attributes = attrs;
    let strong = attributes.remove("strong");
    VerseObject::Word {
        tag: Some("w".to_string()),
        text: Some(text.trim().to_string()),
        content: None,
        strong,
        attributes,
    }
}

/// Parse `key="value"` pairs; a bare value is the default `lemma` attribute.
fn parse_attributes(source: &str) -> Attributes {
    let mut attributes = Attributes::new();
    let source = source.trim();
    if source.is_empty() {
        return attributes;
    }
    if !source.contains('=') {
        attributes.insert("lemma".to_string(), source.to_string());
        return attributes;
    }

    let mut rest = source;
    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let Some(quoted) = after.strip_prefix('"') else {
            break;
        };
        let Some(close) = quoted.find('"') else {
            break;
        };
        let key = key.strip_prefix("x-").unwrap_or(key);
        attributes.insert(key.to_string(), quoted[..close].to_string());
        rest = &quoted[close + 1..];
    }
    attributes
}

fn parse_number(arg: &str) -> Option<u32> {
    let digits: &str = {
        let arg = arg.trim();
        let end = arg
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(arg.len());
        &arg[..end]
    };
    digits.parse().ok()
}

fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn trim_trailing_space(objects: &mut Vec<VerseObject>) {
    while let Some(VerseObject::Text { text, .. }) = objects.last_mut() {
        let trimmed = text.as_deref().unwrap_or_default().trim_end();
        if trimmed.is_empty() {
            objects.pop();
        } else {
            *text = Some(trimmed.to_string());
            break;
        }
    }
}

fn is_header_marker(name: &str) -> bool {
    matches!(
        name,
        "id" | "usfm"
            | "ide"
            | "h"
            | "toc1"
            | "toc2"
            | "toc3"
            | "mt"
            | "mt1"
            | "mt2"
            | "mt3"
            | "rem"
            | "sts"
            | "cl"
    )
}

fn numbered(name: &str, base: &str) -> bool {
    name.strip_prefix(base)
        .is_some_and(|n| n.is_empty() || n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_quote_marker(name: &str) -> bool {
    numbered(name, "q") || numbered(name, "qm") || matches!(name, "qr" | "qc")
}

fn is_paragraph_marker(name: &str) -> bool {
    matches!(
        name,
        "p" | "m" | "nb" | "pc" | "pr" | "pmo" | "pm" | "pmc" | "pmr" | "cls" | "b" | "lit"
    ) || numbered(name, "pi")
        || numbered(name, "mi")
        || numbered(name, "li")
        || numbered(name, "ph")
}

fn is_section_marker(name: &str) -> bool {
    numbered(name, "s") || numbered(name, "ms") || matches!(name, "mr" | "sr" | "sp" | "qa")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token<'_>> {
        Lexer::new(src).collect()
    }

    #[test]
    fn test_lexer() {
        assert_eq!(
            tokens("\\v 1 In \\w God|strong=\"H1\"\\w*\\zaln-e\\*"),
            vec![
                Token::Marker("v"),
                Token::Text("1 In "),
                Token::Marker("w"),
                Token::Text("God|strong=\"H1\""),
                Token::EndMarker("w"),
                Token::Marker("zaln-e"),
                Token::AttrEnd,
            ]
        );
    }

    #[test]
    fn test_lexer_nested_character_marker() {
        assert_eq!(
            tokens("\\f + \\+w a\\+w*\\f*"),
            vec![
                Token::Marker("f"),
                Token::Text("+ "),
                Token::Marker("w"),
                Token::Text("a"),
                Token::EndMarker("w"),
                Token::EndMarker("f"),
            ]
        );
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(" x-strong=\"H0430\" x-morph=\"He,Ncmpa\" lemma=\"אֱלֹהִים\"");
        assert_eq!(attrs.get("strong").map(String::as_str), Some("H0430"));
        assert_eq!(attrs.get("morph").map(String::as_str), Some("He,Ncmpa"));
        assert_eq!(attrs.get("lemma").map(String::as_str), Some("אֱלֹהִים"));
        assert_eq!(parse_attributes("grace").get("lemma").map(String::as_str), Some("grace"));
    }

    #[test]
    fn test_simple_chapter() {
        let usfm = "\\id GEN\n\\h Genesis\n\\c 1\n\\p\n\\v 1 In the beginning\n\\v 2 The earth\nwas empty.\n";
        let doc = usfm_to_chapters(usfm).unwrap();
        assert_eq!(doc.header.book_code.as_deref(), Some("GEN"));
        assert_eq!(doc.header.get("h"), Some("Genesis"));
        let text = doc.chapters[0].text.as_ref().unwrap();
        assert_eq!(text.verse(1), Some(&Verse::plain(1, "In the beginning")));
        assert_eq!(text.verse(2), Some(&Verse::plain(2, "The earth was empty.")));
    }

    #[test]
    fn test_alignment_nesting() {
        let usfm = "\\c 1\n\\v 1 \\zaln-s |x-strong=\"H1\"\\*\\k-s\\*\\w God\\w*\\k-e\\*\\zaln-e\\* said";
        let doc = usfm_to_chapters(usfm).unwrap();
        let objects = doc.chapters[0].text.as_ref().unwrap().verses()[0]
            .verse_objects
            .clone()
            .unwrap();
        let VerseObject::Milestone {
            tag,
            children,
            attributes,
        } = &objects[0]
        else {
            panic!("expected milestone, got {:?}", objects[0]);
        };
        assert_eq!(tag, "zaln");
        assert_eq!(attributes.get("strong").map(String::as_str), Some("H1"));
        assert_eq!(
            children,
            &vec![VerseObject::milestone("k", vec![VerseObject::word("God")])]
        );
        assert_eq!(objects[1], VerseObject::text(" said"));
    }

    #[test]
    fn test_verse_before_chapter_fails() {
        assert!(matches!(
            usfm_to_chapters("\\id GEN\n\\v 1 text"),
            Err(Error::InvalidUsfm(_))
        ));
    }

    #[test]
    fn test_duplicate_chapter_fails() {
        assert!(matches!(
            usfm_to_chapters("\\c 1\n\\v 1 a\n\\c 1\n\\v 1 b\n"),
            Err(Error::DuplicateChapter(1))
        ));
    }

    #[test]
    fn test_title_and_reference_verses() {
        let usfm = "\\c 3\n\\d A psalm\n\\p\n\\v 1 Text\n\\r Psalm 3\n";
        let doc = usfm_to_chapters(usfm).unwrap();
        let text = doc.chapters[0].text.as_ref().unwrap();
        assert_eq!(text.verse(0), Some(&Verse::plain(0, "A psalm")));
        assert_eq!(text.verse(1), Some(&Verse::plain(1, "Text")));
        assert_eq!(text.verse(200), Some(&Verse::plain(200, "Psalm 3")));
    }

    #[test]
    fn test_heading_before_first_verse_joins_it() {
        let usfm = "\\c 1\n\\s1 The Creation\n\\p\n\\v 1 In the beginning\n\\v 2 The earth\n";
        let doc = usfm_to_chapters(usfm).unwrap();
        let text = doc.chapters[0].text.as_ref().unwrap();
        assert_eq!(
            text.verse(1),
            Some(&Verse::new(
                1,
                vec![
                    VerseObject::Section {
                        tag: Some("s1".to_string()),
                        content: Some("The Creation".to_string()),
                    },
                    VerseObject::Paragraph {
                        tag: Some("p".to_string()),
                    },
                    VerseObject::text("In the beginning"),
                ]
            ))
        );
        assert_eq!(text.verse(2), Some(&Verse::plain(2, "The earth")));
    }

    #[test]
    fn test_trailing_nodes_after_last_verse_are_dropped() {
        let usfm = "\\c 1\n\\d Title\n\\s1 Orphan\n\\c 2\n\\v 1 Text\n";
        let doc = usfm_to_chapters(usfm).unwrap();
        let first = doc.chapters[0].text.as_ref().unwrap();
        assert_eq!(first.verse_count(), 0);
        assert_eq!(first.verse(0), Some(&Verse::plain(0, "Title")));
        let second = doc.chapters[1].text.as_ref().unwrap();
        assert_eq!(second.verse(1), Some(&Verse::plain(1, "Text")));
    }

    #[test]
    fn test_footnote_keeps_inner_markers() {
        let usfm = "\\c 1\n\\v 1 Word\\f + \\ft Or: light\\f* rest";
        let doc = usfm_to_chapters(usfm).unwrap();
        let objects = doc.chapters[0].text.as_ref().unwrap().verses()[0]
            .verse_objects
            .clone()
            .unwrap();
        assert_eq!(objects[1], VerseObject::footnote("+ \\ft Or: light"));
    }
}

//! Verse Object Model → plain inline text.
//!
//! Every node kind has exactly one rendering, and malformed or unknown nodes
//! degrade to an empty string instead of failing: a chapter must always
//! produce some text even when the tokenizer left artifacts behind.

use crate::model::VerseObject;

/// Render a sequence of verse objects as one verse's text.
///
/// Nodes are concatenated without separators; tokens are expected to carry
/// their own whitespace.
///
/// # Examples
///
/// ```
/// use scriptura::model::VerseObject;
/// use scriptura::render::render_verse_text;
///
/// let verse = vec![
///     VerseObject::text("In the beginning "),
///     VerseObject::strong_word("God", "H0430"),
///     VerseObject::text(" created."),
/// ];
/// assert_eq!(render_verse_text(&verse, false), "In the beginning God created.");
/// ```
pub fn render_verse_text(nodes: &[VerseObject], show_unsupported: bool) -> String {
    let mut out = String::new();
    for node in nodes {
        push_inline(&mut out, node, show_unsupported);
    }
    out
}

/// Render a single verse object.
///
/// With `show_unsupported`, unknown node kinds render as `/tag content tag/`
/// instead of disappearing.
pub fn render_inline(node: &VerseObject, show_unsupported: bool) -> String {
    let mut out = String::new();
    push_inline(&mut out, node, show_unsupported);
    out
}

fn push_inline(out: &mut String, node: &VerseObject, show_unsupported: bool) {
    match node {
        VerseObject::Text { text, next_char } | VerseObject::Quote { text, next_char, .. } => {
            out.push_str(first_non_empty(text, next_char));
        }
        VerseObject::Milestone { tag, children, .. } => match tag.as_str() {
            "k" => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    push_inline(out, child, show_unsupported);
                }
            }
            "zaln" => match children.as_slice() {
                [only] if only.is_milestone() => push_inline(out, only, show_unsupported),
                _ => push_aligned_words(out, children),
            },
            _ => {}
        },
        VerseObject::Word { strong: Some(_), .. } => {
            push_aligned_words(out, std::slice::from_ref(node));
        }
        VerseObject::Word { text, content, .. } => {
            out.push_str(first_non_empty(text, content));
        }
        VerseObject::Section { content, .. } => {
            out.push_str(content.as_deref().unwrap_or_default());
        }
        VerseObject::Paragraph { .. } => out.push('\n'),
        VerseObject::Footnote { content, .. } => {
            out.push_str("/fn ");
            out.push_str(content.as_deref().unwrap_or_default());
            out.push_str(" fn/");
        }
        VerseObject::Unsupported {
            kind,
            tag,
            text,
            content,
        } => {
            log::debug!("unsupported verse object type {kind:?} (tag {tag:?})");
            if show_unsupported {
                let tag = tag.as_deref().unwrap_or(kind);
                out.push('/');
                out.push_str(tag);
                out.push(' ');
                out.push_str(first_non_empty(content, text));
                out.push(' ');
                out.push_str(tag);
                out.push('/');
            }
        }
    }
}

/// Render an aligned run: each element's `text`, else its `content`, with no
/// separator between elements.
fn push_aligned_words(out: &mut String, nodes: &[VerseObject]) {
    for node in nodes {
        out.push_str(surface_text(node));
    }
}

/// Word-level surface text of any node (`text` takes priority over `content`).
fn surface_text(node: &VerseObject) -> &str {
    match node {
        VerseObject::Text { text, .. } | VerseObject::Quote { text, .. } => {
            text.as_deref().unwrap_or_default()
        }
        VerseObject::Word { text, content, .. }
        | VerseObject::Unsupported { text, content, .. } => first_non_empty(text, content),
        VerseObject::Section { content, .. } | VerseObject::Footnote { content, .. } => {
            content.as_deref().unwrap_or_default()
        }
        VerseObject::Milestone { attributes, .. } => attributes
            .get("content")
            .map(String::as_str)
            .unwrap_or_default(),
        VerseObject::Paragraph { .. } => "",
    }
}

/// First value that is present and non-empty, else `""`.
fn first_non_empty<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> &'a str {
    primary
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(fallback.as_deref())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attributes;

    fn unsupported(tag: &str, content: &str) -> VerseObject {
        VerseObject::Unsupported {
            kind: "mystery".to_string(),
            tag: Some(tag.to_string()),
            text: None,
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn test_text_and_quote() {
        let nodes = vec![
            VerseObject::text("Blessed is "),
            VerseObject::Quote {
                tag: Some("q1".to_string()),
                text: Some("the man".to_string()),
                next_char: None,
            },
        ];
        assert_eq!(render_verse_text(&nodes, false), "Blessed is the man");
    }

    #[test]
    fn test_text_falls_back_to_next_char() {
        let node = VerseObject::Text {
            text: None,
            next_char: Some(" ".to_string()),
        };
        assert_eq!(render_inline(&node, false), " ");

        let empty = VerseObject::Text {
            text: None,
            next_char: None,
        };
        assert_eq!(render_inline(&empty, false), "");
    }

    #[test]
    fn test_paragraph_is_newline() {
        let node = VerseObject::Paragraph {
            tag: Some("q2".to_string()),
        };
        assert_eq!(render_inline(&node, true), "\n");
    }

    #[test]
    fn test_footnote() {
        let node = VerseObject::footnote("+ \\ft Or: heavens");
        assert_eq!(render_inline(&node, false), "/fn + \\ft Or: heavens fn/");
    }

    #[test]
    fn test_section() {
        let node = VerseObject::Section {
            tag: Some("s1".to_string()),
            content: Some("The Creation".to_string()),
        };
        assert_eq!(render_inline(&node, false), "The Creation");
    }

    #[test]
    fn test_key_term_joins_with_spaces() {
        let node = VerseObject::milestone(
            "k",
            vec![VerseObject::word("Son"), VerseObject::word("of"), VerseObject::word("Man")],
        );
        assert_eq!(render_inline(&node, false), "Son of Man");
    }

    #[test]
    fn test_zaln_joins_without_separator() {
        let node = VerseObject::milestone(
            "zaln",
            vec![VerseObject::word("the"), VerseObject::text(" "), VerseObject::word("earth")],
        );
        assert_eq!(render_inline(&node, false), "the earth");
    }

    #[test]
    fn test_zaln_unwraps_single_milestone_child() {
        let inner = VerseObject::milestone("zaln", vec![VerseObject::word("God")]);
        let outer = VerseObject::milestone("zaln", vec![inner.clone()]);
        assert_eq!(render_inline(&outer, false), render_inline(&inner, false));
        assert_eq!(render_inline(&outer, false), "God");
    }

    #[test]
    fn test_zaln_mixed_children_use_milestone_content() {
        let mut attributes = Attributes::new();
        attributes.insert("content".to_string(), "וְ".to_string());
        let nested = VerseObject::Milestone {
            tag: "zaln".to_string(),
            children: vec![VerseObject::word("and")],
            attributes,
        };
        let node = VerseObject::milestone("zaln", vec![nested, VerseObject::word("then")]);
        assert_eq!(render_inline(&node, false), "וְthen");
    }

    #[test]
    fn test_unknown_milestone_tag_is_empty() {
        let node = VerseObject::milestone("qt", vec![VerseObject::word("hidden")]);
        assert_eq!(render_inline(&node, false), "");
    }

    #[test]
    fn test_word_prefers_text_over_content() {
        let node = VerseObject::Word {
            tag: Some("w".to_string()),
            text: None,
            content: Some("logos".to_string()),
            strong: None,
            attributes: Attributes::new(),
        };
        assert_eq!(render_inline(&node, false), "logos");

        let node = VerseObject::Word {
            tag: Some("w".to_string()),
            text: Some("word".to_string()),
            content: Some("logos".to_string()),
            strong: Some("G3056".to_string()),
            attributes: Attributes::new(),
        };
        assert_eq!(render_inline(&node, false), "word");
    }

    #[test]
    fn test_unsupported_hidden_by_default() {
        assert_eq!(render_inline(&unsupported("add", "extra"), false), "");
    }

    #[test]
    fn test_unsupported_passthrough() {
        assert_eq!(render_inline(&unsupported("add", "extra"), true), "/add extra add/");
    }

    #[test]
    fn test_unsupported_without_tag_uses_kind() {
        let node = VerseObject::Unsupported {
            kind: "figure".to_string(),
            tag: None,
            text: Some("pic".to_string()),
            content: None,
        };
        assert_eq!(render_inline(&node, true), "/figure pic figure/");
    }

    #[test]
    fn test_text_around_strong_word() {
        let verse = vec![
            VerseObject::text("In the beginning "),
            VerseObject::strong_word("God", "H0430"),
            VerseObject::text(" created."),
        ];
        assert_eq!(render_verse_text(&verse, false), "In the beginning God created.");
    }
}

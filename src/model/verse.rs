//! Verse Object Model: the recursive node tree for one verse's markup.
//!
//! The upstream USFM tokenizer emits flat JSON objects whose meaningful
//! fields depend on their `type`. [`VerseObject`] is the sum type over those
//! kinds; [`RawVerseObject`] mirrors the wire shape and is only used for
//! serde conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extra string attributes carried by words and milestones
/// (`strong`, `lemma`, `morph`, `occurrence`, `occurrences`, `content`, ...).
///
/// Keys are stored without the USFM `x-` prefix.
pub type Attributes = BTreeMap<String, String>;

/// One node of a verse's markup tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVerseObject", into = "RawVerseObject")]
pub enum VerseObject {
    /// Plain run of text. Carries its own surrounding whitespace.
    Text {
        text: Option<String>,
        next_char: Option<String>,
    },
    /// Poetry/quote text introduced by a `\q#` marker.
    Quote {
        tag: Option<String>,
        text: Option<String>,
        next_char: Option<String>,
    },
    /// A single word, optionally annotated with a Strong's number.
    Word {
        tag: Option<String>,
        text: Option<String>,
        content: Option<String>,
        strong: Option<String>,
        attributes: Attributes,
    },
    /// Alignment (`zaln`), key-term (`k`) or other milestone owning its children.
    Milestone {
        tag: String,
        children: Vec<VerseObject>,
        attributes: Attributes,
    },
    /// Section heading (`\s#`).
    Section {
        tag: Option<String>,
        content: Option<String>,
    },
    /// Paragraph break (`\p`, `\m`, `\q` without text, ...).
    Paragraph { tag: Option<String> },
    /// Footnote; `content` holds the raw footnote body including inner markers.
    Footnote {
        tag: Option<String>,
        content: Option<String>,
    },
    /// Any node whose `type` is not one of the kinds above.
    Unsupported {
        kind: String,
        tag: Option<String>,
        text: Option<String>,
        content: Option<String>,
    },
}

impl VerseObject {
    /// Shorthand for a text node.
    pub fn text(text: impl Into<String>) -> Self {
        VerseObject::Text {
            text: Some(text.into()),
            next_char: None,
        }
    }

    /// Shorthand for a plain word.
    pub fn word(text: impl Into<String>) -> Self {
        VerseObject::Word {
            tag: Some("w".to_string()),
            text: Some(text.into()),
            content: None,
            strong: None,
            attributes: Attributes::new(),
        }
    }

    /// Shorthand for a word annotated with a Strong's number.
    pub fn strong_word(text: impl Into<String>, strong: impl Into<String>) -> Self {
        VerseObject::Word {
            tag: Some("w".to_string()),
            text: Some(text.into()),
            content: None,
            strong: Some(strong.into()),
            attributes: Attributes::new(),
        }
    }

    /// Shorthand for a milestone with no attributes.
    pub fn milestone(tag: impl Into<String>, children: Vec<VerseObject>) -> Self {
        VerseObject::Milestone {
            tag: tag.into(),
            children,
            attributes: Attributes::new(),
        }
    }

    /// Shorthand for a `\p` paragraph break.
    pub fn paragraph() -> Self {
        VerseObject::Paragraph {
            tag: Some("p".to_string()),
        }
    }

    /// Shorthand for a `\f` footnote.
    pub fn footnote(content: impl Into<String>) -> Self {
        VerseObject::Footnote {
            tag: Some("f".to_string()),
            content: Some(content.into()),
        }
    }

    /// The wire `type` of this node.
    pub fn kind(&self) -> &str {
        match self {
            VerseObject::Text { .. } => "text",
            VerseObject::Quote { .. } => "quote",
            VerseObject::Word { .. } => "word",
            VerseObject::Milestone { .. } => "milestone",
            VerseObject::Section { .. } => "section",
            VerseObject::Paragraph { .. } => "paragraph",
            VerseObject::Footnote { .. } => "footnote",
            VerseObject::Unsupported { kind, .. } => kind,
        }
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self, VerseObject::Milestone { .. })
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, VerseObject::Paragraph { .. })
    }
}

/// Wire shape of a verse object as produced by the USFM tokenizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVerseObject {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strong: Option<String>,
    #[serde(rename = "nextChar", default, skip_serializing_if = "Option::is_none")]
    next_char: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<VerseObject>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Keep scalar attribute values, stringifying numbers and booleans.
///
/// `endTag` is derived from the tag on output, so it is dropped here.
fn string_attributes(extra: BTreeMap<String, Value>) -> Attributes {
    extra
        .into_iter()
        .filter(|(key, _)| key != "endTag")
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect()
}

impl From<RawVerseObject> for VerseObject {
    fn from(raw: RawVerseObject) -> Self {
        match raw.kind.as_str() {
            "text" => VerseObject::Text {
                text: raw.text,
                next_char: raw.next_char,
            },
            "quote" => VerseObject::Quote {
                tag: raw.tag,
                text: raw.text,
                next_char: raw.next_char,
            },
            "word" => VerseObject::Word {
                tag: raw.tag,
                text: raw.text,
                content: raw.content,
                strong: raw.strong,
                attributes: string_attributes(raw.extra),
            },
            "milestone" => {
                let mut attributes = string_attributes(raw.extra);
                if let Some(strong) = raw.strong {
                    attributes.insert("strong".to_string(), strong);
                }
                if let Some(content) = raw.content {
                    attributes.insert("content".to_string(), content);
                }
                VerseObject::Milestone {
                    tag: raw.tag.unwrap_or_default(),
                    children: raw.children.unwrap_or_default(),
                    attributes,
                }
            }
            "section" => VerseObject::Section {
                tag: raw.tag,
                content: raw.content,
            },
            "paragraph" => VerseObject::Paragraph { tag: raw.tag },
            "footnote" => VerseObject::Footnote {
                tag: raw.tag,
                content: raw.content,
            },
            _ => VerseObject::Unsupported {
                kind: raw.kind,
                tag: raw.tag,
                text: raw.text,
                content: raw.content,
            },
        }
    }
}

impl From<VerseObject> for RawVerseObject {
    fn from(node: VerseObject) -> Self {
        let kind = node.kind().to_string();
        let mut raw = RawVerseObject {
            kind,
            ..Default::default()
        };
        match node {
            VerseObject::Text { text, next_char } => {
                raw.text = text;
                raw.next_char = next_char;
            }
            VerseObject::Quote {
                tag,
                text,
                next_char,
            } => {
                raw.tag = tag;
                raw.text = text;
                raw.next_char = next_char;
            }
            VerseObject::Word {
                tag,
                text,
                content,
                strong,
                attributes,
            } => {
                raw.tag = tag;
                raw.text = text;
                raw.content = content;
                raw.strong = strong;
                raw.extra = attributes
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
            }
            VerseObject::Milestone {
                tag,
                children,
                mut attributes,
            } => {
                raw.tag = Some(tag);
                raw.strong = attributes.remove("strong");
                raw.content = attributes.remove("content");
                raw.children = Some(children);
                raw.extra = attributes
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
            }
            VerseObject::Section { tag, content } | VerseObject::Footnote { tag, content } => {
                raw.tag = tag;
                raw.content = content;
            }
            VerseObject::Paragraph { tag } => {
                raw.tag = tag;
            }
            VerseObject::Unsupported {
                tag, text, content, ..
            } => {
                raw.tag = tag;
                raw.text = text;
                raw.content = content;
            }
        }
        raw
    }
}

//! Verses and chapters as handed over by the content store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::verse::VerseObject;

/// Verse number of the title pseudo-verse.
pub const TITLE_VERSE: u32 = 0;

/// Verse number of the reference/back-matter pseudo-verse.
pub const REFERENCE_VERSE: u32 = 200;

/// One verse: its number and markup tree.
///
/// `verse_objects` is `None` when the verse has not been translated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Verse {
    pub num: u32,
    pub verse_objects: Option<Vec<VerseObject>>,
}

impl Verse {
    pub fn new(num: u32, verse_objects: Vec<VerseObject>) -> Self {
        Self {
            num,
            verse_objects: Some(verse_objects),
        }
    }

    /// A verse whose content is an already flattened translation.
    pub fn plain(num: u32, text: impl Into<String>) -> Self {
        Self::new(num, vec![VerseObject::text(text)])
    }

    pub fn untranslated(num: u32) -> Self {
        Self {
            num,
            verse_objects: None,
        }
    }

    pub fn is_translated(&self) -> bool {
        self.verse_objects.is_some()
    }

    /// True for the title (0) and reference (200) pseudo-verses.
    pub fn is_pseudo(&self) -> bool {
        is_pseudo_verse(self.num)
    }
}

pub fn is_pseudo_verse(num: u32) -> bool {
    num == TITLE_VERSE || num == REFERENCE_VERSE
}

/// Verse content as it appears in chapter JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VerseContent {
    Plain(String),
    Objects(Vec<VerseObject>),
    Wrapped {
        #[serde(rename = "verseObjects")]
        verse_objects: Vec<VerseObject>,
    },
}

impl From<VerseContent> for Vec<VerseObject> {
    fn from(content: VerseContent) -> Self {
        match content {
            VerseContent::Plain(text) => vec![VerseObject::text(text)],
            VerseContent::Objects(objects) => objects,
            VerseContent::Wrapped { verse_objects } => verse_objects,
        }
    }
}

/// Ordered verses of one chapter, decoded from a `{ "verseNum": content }` map.
///
/// Verses are kept sorted by number. Keys that are not verse numbers (such as
/// the tokenizer's `front` entry) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Option<VerseContent>>",
    into = "BTreeMap<String, Option<Vec<VerseObject>>>"
)]
pub struct ChapterText {
    verses: Vec<Verse>,
}

impl ChapterText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from verses in any order.
    pub fn from_verses(mut verses: Vec<Verse>) -> Self {
        verses.sort_by_key(|v| v.num);
        Self { verses }
    }

    /// Insert a verse, replacing any verse with the same number.
    pub fn insert(&mut self, verse: Verse) {
        match self.verses.binary_search_by_key(&verse.num, |v| v.num) {
            Ok(idx) => self.verses[idx] = verse,
            Err(idx) => self.verses.insert(idx, verse),
        }
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn verse(&self, num: u32) -> Option<&Verse> {
        self.verses
            .binary_search_by_key(&num, |v| v.num)
            .ok()
            .map(|idx| &self.verses[idx])
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Highest real verse number, ignoring the title and reference pseudo-verses.
    pub fn max_verse_num(&self) -> Option<u32> {
        self.verses
            .iter()
            .filter(|v| !v.is_pseudo())
            .map(|v| v.num)
            .max()
    }

    /// Number of real verses (pseudo-verses excluded).
    pub fn verse_count(&self) -> usize {
        self.verses.iter().filter(|v| !v.is_pseudo()).count()
    }

    /// True if at least one verse carries a translation.
    pub fn has_translation(&self) -> bool {
        self.verses.iter().any(Verse::is_translated)
    }
}

impl From<BTreeMap<String, Option<VerseContent>>> for ChapterText {
    fn from(map: BTreeMap<String, Option<VerseContent>>) -> Self {
        let mut verses = Vec::with_capacity(map.len());
        for (key, content) in map {
            let Ok(num) = key.trim().parse::<u32>() else {
                log::debug!("skipping non-numeric verse key {key:?}");
                continue;
            };
            verses.push(Verse {
                num,
                verse_objects: content.map(Into::into),
            });
        }
        Self::from_verses(verses)
    }
}

impl From<ChapterText> for BTreeMap<String, Option<Vec<VerseObject>>> {
    fn from(text: ChapterText) -> Self {
        text.verses
            .into_iter()
            .map(|v| (v.num.to_string(), v.verse_objects))
            .collect()
    }
}

/// A chapter row: its number and (possibly absent) verse map.
///
/// `text` is `None` when nothing in the chapter has been translated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub num: u32,
    #[serde(default)]
    pub text: Option<ChapterText>,
}

impl Chapter {
    pub fn new(num: u32, text: ChapterText) -> Self {
        Self {
            num,
            text: Some(text),
        }
    }

    pub fn untranslated(num: u32) -> Self {
        Self { num, text: None }
    }

    pub fn max_verse_num(&self) -> Option<u32> {
        self.text.as_ref().and_then(ChapterText::max_verse_num)
    }

    pub fn verse_count(&self) -> usize {
        self.text.as_ref().map_or(0, ChapterText::verse_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_verse_content() {
        let json = r#"{
            "0": "The Creation",
            "2": [{"type": "text", "text": "Second"}],
            "1": {"verseObjects": [{"type": "text", "text": "First"}]},
            "10": null,
            "200": "A Bible story from: Genesis 1-2",
            "front": "ignored"
        }"#;
        let text: ChapterText = serde_json::from_str(json).unwrap();
        let nums: Vec<u32> = text.verses().iter().map(|v| v.num).collect();
        assert_eq!(nums, vec![0, 1, 2, 10, 200]);
        assert!(!text.verse(10).unwrap().is_translated());
        assert_eq!(
            text.verse(1).unwrap().verse_objects,
            Some(vec![VerseObject::text("First")])
        );
    }

    #[test]
    fn test_max_verse_num_skips_pseudo_verses() {
        let text = ChapterText::from_verses(vec![
            Verse::plain(200, "reference"),
            Verse::plain(0, "title"),
            Verse::plain(3, "c"),
            Verse::untranslated(7),
            Verse::plain(1, "a"),
        ]);
        assert_eq!(text.max_verse_num(), Some(7));
        assert_eq!(text.verse_count(), 3);
    }

    #[test]
    fn test_max_verse_num_only_pseudo() {
        let text =
            ChapterText::from_verses(vec![Verse::plain(0, "title"), Verse::plain(200, "ref")]);
        assert_eq!(text.max_verse_num(), None);
        assert_eq!(text.verse_count(), 0);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut text = ChapterText::new();
        text.insert(Verse::plain(2, "b"));
        text.insert(Verse::plain(1, "a"));
        text.insert(Verse::plain(2, "B"));
        assert_eq!(text.len(), 2);
        assert_eq!(text.verse(2), Some(&Verse::plain(2, "B")));
    }

    #[test]
    fn test_chapter_row_with_null_text() {
        let chapter: Chapter = serde_json::from_str(r#"{"num": 4, "text": null}"#).unwrap();
        assert_eq!(chapter, Chapter::untranslated(4));
        assert_eq!(chapter.verse_count(), 0);
    }
}

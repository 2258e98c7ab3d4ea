//! USFM conversion.
//!
//! - [`chapters_to_usfm`]: chapters plus book/project metadata → a USFM book
//! - [`usfm_to_chapters`]: a USFM book → header markers and chapters
//!
//! Word and milestone attributes use the USFM 3 `x-` prefix for anything
//! that is not a standard `\w` attribute; the reader strips it again.

mod reader;
mod writer;

pub use reader::{UsfmDocument, UsfmHeader, usfm_to_chapters};
pub use writer::{chapters_to_usfm, write_node};

/// Configuration for USFM output.
#[derive(Debug, Clone)]
pub struct UsfmConfig {
    /// Value of the `\usfm` header marker.
    pub usfm_version: String,
}

impl Default for UsfmConfig {
    fn default() -> Self {
        Self {
            usfm_version: "3.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Book, Chapter, ChapterText, Project, ScriptureProperties, Verse, VerseObject};

    fn genesis() -> Book {
        Book::new("gen").with_scripture(ScriptureProperties {
            h: Some("Genesis".to_string()),
            toc1: Some("The Book of Genesis".to_string()),
            toc2: Some("Genesis".to_string()),
            toc3: Some("Gen".to_string()),
            mt: None,
            chapter_label: Some("Chapter".to_string()),
        })
    }

    #[test]
    fn test_header_and_body() {
        let project = Project::new("ult", "Literal Text").with_language("en", "English");
        let chapters = vec![
            Chapter::new(
                1,
                ChapterText::from_verses(vec![
                    Verse::plain(1, "In the beginning"),
                    Verse::untranslated(2),
                    Verse::new(
                        3,
                        vec![
                            VerseObject::text("God said, "),
                            VerseObject::strong_word("light", "H0216"),
                        ],
                    ),
                ]),
            ),
            Chapter::untranslated(2),
        ];
        let usfm = chapters_to_usfm(&chapters, &genesis(), &project, &UsfmConfig::default());
        assert_eq!(
            usfm,
            "\\id GEN en_ult English Literal Text\n\
             \\usfm 3.0\n\
             \\ide UTF-8\n\
             \\h Genesis\n\
             \\toc1 The Book of Genesis\n\
             \\toc2 Genesis\n\
             \\toc3 Gen\n\
             \\mt The Book of Genesis\n\
             \\cl Chapter\n\
             \n\
             \\c 1\n\
             \\p\n\
             \\v 1 In the beginning\n\
             \\v 3 God said, \\w light|strong=\"H0216\"\\w*\n"
        );
    }

    #[test]
    fn test_written_usfm_reads_back() {
        let project = Project::new("ult", "Literal Text");
        let chapters = vec![Chapter::new(
            1,
            ChapterText::from_verses(vec![
                Verse::plain(0, "A psalm of David"),
                Verse::plain(1, "In the beginning"),
                Verse::new(
                    2,
                    vec![
                        VerseObject::milestone("k", vec![VerseObject::word("Messiah")]),
                        VerseObject::text(" came"),
                    ],
                ),
            ]),
        )];
        let book = genesis();
        let usfm = chapters_to_usfm(&chapters, &book, &project, &UsfmConfig::default());
        let doc = usfm_to_chapters(&usfm).unwrap();
        assert_eq!(doc.chapters, chapters);

        let read = doc.into_book();
        assert_eq!(read.code, "gen");
        assert_eq!(read.toc1(), Some("The Book of Genesis"));
        assert_eq!(read.chapter_label(), Some("Chapter"));
    }
}

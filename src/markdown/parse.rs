//! OBS Markdown → chapter.
//!
//! The inverse of [`chapter_to_markdown`](super::chapter_to_markdown) up to
//! whitespace: frames are numbered sequentially from 1 in document order,
//! images are dropped, and footnote markup is kept as literal text.

use crate::model::{ChapterText, REFERENCE_VERSE, TITLE_VERSE, Verse};

/// Parse one OBS story.
///
/// A single `_italic_` line is the reference only when it is the last block;
/// anywhere else it is a frame. A last frame that is itself italic is written
/// with a leading `\` and read back as a frame.
pub fn markdown_to_chapter(markdown: &str) -> ChapterText {
    let mut text = ChapterText::new();
    let mut frame = 0;

    let blocks: Vec<Vec<&str>> = split_blocks(markdown)
        .into_iter()
        .map(|block| {
            block
                .into_iter()
                .map(str::trim)
                .filter(|line| image_src(line).is_none())
                .collect::<Vec<_>>()
        })
        .filter(|lines| !lines.is_empty())
        .collect();
    let last = blocks.len().saturating_sub(1);

    for (i, mut lines) in blocks.into_iter().enumerate() {
        let first = lines[0];

        if frame == 0
            && text.verse(TITLE_VERSE).is_none()
            && let Some(title) = heading_text(first)
        {
            let mut title = title.to_string();
            for line in &lines[1..] {
                title.push(' ');
                title.push_str(line);
            }
            text.insert(Verse::plain(TITLE_VERSE, title));
            continue;
        }

        if i == last && lines.len() == 1 {
            if let Some(reference) = emphasized(first) {
                text.insert(Verse::plain(REFERENCE_VERSE, reference));
                continue;
            }
            if let Some(escaped) = first.strip_prefix('\\')
                && emphasized(escaped).is_some()
            {
                lines[0] = escaped;
            }
        }

        frame += 1;
        text.insert(Verse::plain(frame, lines.join("\n")));
    }

    text
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
        Some(line[hashes..].trim())
    } else {
        None
    }
}

/// Content of a whole-line `_emphasis_` (or `*emphasis*`).
pub(super) fn emphasized(line: &str) -> Option<&str> {
    for mark in ['_', '*'] {
        if line.len() > 2 && line.starts_with(mark) && line.ends_with(mark) {
            let inner = line[1..line.len() - 1].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }
    None
}

/// Split text into blank-line separated blocks of non-empty lines.
pub(crate) fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Source of a Markdown image line `![alt](src)`.
pub(crate) fn image_src(line: &str) -> Option<&str> {
    let line = line.trim();
    if !line.starts_with("![") || !line.ends_with(')') {
        return None;
    }
    let open = line.find("](")?;
    Some(&line[open + 2..line.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_story() {
        let md = "# 1. The Creation\n\n\
                  ![OBS Image](https://img/obs-en-01-01.jpg)\n\n\
                  This is how God made everything.\n\n\
                  ![OBS Image](https://img/obs-en-01-02.jpg)\n\n\
                  Then God said.\nLet there be light.\n\n\
                  _A Bible story from: Genesis 1-2_\n";
        let text = markdown_to_chapter(md);
        let nums: Vec<u32> = text.verses().iter().map(|v| v.num).collect();
        assert_eq!(nums, vec![0, 1, 2, 200]);
        assert_eq!(text.verse(0), Some(&Verse::plain(0, "1. The Creation")));
        assert_eq!(
            text.verse(2),
            Some(&Verse::plain(2, "Then God said.\nLet there be light."))
        );
        assert_eq!(
            text.verse(200),
            Some(&Verse::plain(200, "A Bible story from: Genesis 1-2"))
        );
    }

    #[test]
    fn test_image_directly_above_text() {
        let md = "![OBS Image](a.jpg)\nFrame one.\n";
        let text = markdown_to_chapter(md);
        assert_eq!(text.verse(1), Some(&Verse::plain(1, "Frame one.")));
    }

    #[test]
    fn test_second_heading_is_a_frame() {
        let md = "# Title\n\n# Not a title\n";
        let text = markdown_to_chapter(md);
        assert_eq!(text.verse(1), Some(&Verse::plain(1, "# Not a title")));
    }

    #[test]
    fn test_italic_frame_before_last_block_is_a_frame() {
        let md = "First frame.\n\n_Whole frame in italics._\n\nThird frame.\n";
        let text = markdown_to_chapter(md);
        let nums: Vec<u32> = text.verses().iter().map(|v| v.num).collect();
        assert_eq!(nums, vec![1, 2, 3]);
        assert_eq!(
            text.verse(2),
            Some(&Verse::plain(2, "_Whole frame in italics._"))
        );
    }

    #[test]
    fn test_escaped_italic_last_frame() {
        let text = markdown_to_chapter("First frame.\n\n\\_Last frame._\n");
        assert_eq!(text.verse(2), Some(&Verse::plain(2, "_Last frame._")));
        assert!(text.verse(200).is_none());
    }

    #[test]
    fn test_empty_document() {
        assert!(markdown_to_chapter("\n\n").is_empty());
    }

    #[test]
    fn test_image_src() {
        assert_eq!(image_src("![OBS Image](x.jpg)"), Some("x.jpg"));
        assert_eq!(image_src("not an image"), None);
    }

    #[test]
    fn test_split_blocks() {
        let blocks = split_blocks("a\nb\n\n\n c \n");
        assert_eq!(blocks, vec![vec!["a", "b"], vec![" c "]]);
    }
}

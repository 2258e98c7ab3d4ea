//! Chapter → OBS Markdown.

use crate::model::{ChapterText, REFERENCE_VERSE, TITLE_VERSE};
use crate::render::render_verse_text;

use super::MarkdownConfig;
use super::parse::emphasized;

/// Render one story as Markdown.
///
/// Untranslated verses are left out. A closing frame that is one italic line
/// gets a leading `\` so it is not read back as the reference. A story with no translated verse at
/// all renders as an empty string so callers can skip it.
pub fn chapter_to_markdown(text: &ChapterText, story: u32, config: &MarkdownConfig) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut last_is_frame = false;

    for verse in text.verses() {
        let Some(objects) = &verse.verse_objects else {
            continue;
        };
        let body = render_verse_text(objects, config.show_unsupported);
        let body = body.trim();

        match verse.num {
            TITLE_VERSE => {
                if !body.is_empty() {
                    blocks.push(format!("# {}", single_line(body)));
                    last_is_frame = false;
                }
            }
            REFERENCE_VERSE => {
                if !body.is_empty() {
                    blocks.push(format!("_{}_", single_line(body)));
                    last_is_frame = false;
                }
            }
            frame => {
                let body = frame_body(body);
                if body.is_empty() {
                    continue;
                }
                if config.with_images {
                    blocks.push(format!(
                        "![OBS Image]({})",
                        config.images.frame_url(story, frame)
                    ));
                }
                blocks.push(body);
                last_is_frame = true;
            }
        }
    }

    if blocks.is_empty() {
        return String::new();
    }
    if last_is_frame
        && let Some(last) = blocks.last_mut()
        && !last.contains('\n')
        && emphasized(last).is_some()
    {
        last.insert(0, '\\');
    }
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Frame text may span lines but must not contain a blank line, which would
/// start a new frame.
fn frame_body(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Headings and reference lines must stay on one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

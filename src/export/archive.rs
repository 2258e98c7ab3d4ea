//! In-memory file tree for OBS archive downloads.
//!
//! An OBS book archive looks like:
//!
//! ```text
//! content/
//!   1.md ... 50.md       one file per translated story, named by number
//!   back/intro.md        properties.obs.back
//!   front/intro.md       properties.obs.intro
//!   front/title.md       properties.obs.title
//! ```
//!
//! The front and back folders only exist when the book carries the
//! corresponding metadata.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::markdown::{MarkdownConfig, chapter_to_markdown};
use crate::model::Book;

/// Name of the archive's root folder.
pub const ROOT_FOLDER: &str = "content";

/// A file or folder in an export archive.
///
/// Serializes to the `{ name, isFolder, content }` shape, where `content`
/// is the file text or the folder's children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum ExportFileNode {
    File { name: String, content: String },
    Folder { name: String, children: Vec<ExportFileNode> },
}

impl ExportFileNode {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        ExportFileNode::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<ExportFileNode>) -> Self {
        ExportFileNode::Folder {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExportFileNode::File { name, .. } | ExportFileNode::Folder { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, ExportFileNode::Folder { .. })
    }

    /// Direct child with the given name, if this is a folder.
    pub fn child(&self, name: &str) -> Option<&ExportFileNode> {
        match self {
            ExportFileNode::Folder { children, .. } => children.iter().find(|c| c.name() == name),
            ExportFileNode::File { .. } => None,
        }
    }

    /// Node at a `/`-separated path relative to this node.
    pub fn find(&self, path: &str) -> Option<&ExportFileNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Every file below this node as `(path, content)`, depth first, with
    /// paths rooted at this node's name.
    pub fn files(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        collect_files(self, "", &mut out);
        out
    }
}

fn collect_files<'a>(node: &'a ExportFileNode, prefix: &str, out: &mut Vec<(String, &'a str)>) {
    let path = if prefix.is_empty() {
        node.name().to_string()
    } else {
        format!("{prefix}/{}", node.name())
    };
    match node {
        ExportFileNode::File { content, .. } => out.push((path, content)),
        ExportFileNode::Folder { children, .. } => {
            for child in children {
                collect_files(child, &path, out);
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawNode {
    name: String,
    #[serde(rename = "isFolder", default)]
    is_folder: bool,
    content: RawContent,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Children(Vec<ExportFileNode>),
}

impl TryFrom<RawNode> for ExportFileNode {
    type Error = String;

    fn try_from(raw: RawNode) -> std::result::Result<Self, String> {
        match (raw.is_folder, raw.content) {
            (true, RawContent::Children(children)) => Ok(ExportFileNode::folder(raw.name, children)),
            (false, RawContent::Text(content)) => Ok(ExportFileNode::file(raw.name, content)),
            (true, RawContent::Text(_)) => Err(format!("folder {:?} has text content", raw.name)),
            (false, RawContent::Children(_)) => {
                Err(format!("file {:?} has folder content", raw.name))
            }
        }
    }
}

impl From<ExportFileNode> for RawNode {
    fn from(node: ExportFileNode) -> Self {
        match node {
            ExportFileNode::File { name, content } => RawNode {
                name,
                is_folder: false,
                content: RawContent::Text(content),
            },
            ExportFileNode::Folder { name, children } => RawNode {
                name,
                is_folder: true,
                content: RawContent::Children(children),
            },
        }
    }
}

/// Step-by-step construction of an OBS archive tree.
///
/// ```
/// use scriptura::export::ArchiveBuilder;
///
/// let tree = ArchiveBuilder::new()
///     .story(1, "# 1. The Creation\n")
///     .front_title("Open Bible Stories")
///     .build()
///     .unwrap();
/// assert!(tree.find("front/title.md").is_some());
/// assert!(tree.find("back").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    stories: Vec<(u32, String)>,
    back_intro: Option<String>,
    front_intro: Option<String>,
    front_title: Option<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a story file named `{num}.md`.
    pub fn story(mut self, num: u32, markdown: impl Into<String>) -> Self {
        self.stories.push((num, markdown.into()));
        self
    }

    /// Set `back/intro.md`.
    pub fn back_intro(mut self, markdown: impl Into<String>) -> Self {
        self.back_intro = Some(markdown.into());
        self
    }

    /// Set `front/intro.md`.
    pub fn front_intro(mut self, markdown: impl Into<String>) -> Self {
        self.front_intro = Some(markdown.into());
        self
    }

    /// Set `front/title.md`.
    pub fn front_title(mut self, markdown: impl Into<String>) -> Self {
        self.front_title = Some(markdown.into());
        self
    }

    /// Assemble the tree.
    ///
    /// Fails with [`Error::DuplicateChapter`] if two stories share a number.
    pub fn build(self) -> Result<ExportFileNode> {
        let mut seen = BTreeSet::new();
        let mut children = Vec::with_capacity(self.stories.len() + 2);

        for (num, markdown) in self.stories {
            if !seen.insert(num) {
                return Err(Error::DuplicateChapter(num));
            }
            children.push(ExportFileNode::file(story_file_name(num), markdown));
        }

        if let Some(back) = self.back_intro {
            children.push(ExportFileNode::folder(
                "back",
                vec![ExportFileNode::file("intro.md", back)],
            ));
        }

        let front: Vec<ExportFileNode> = [("intro.md", self.front_intro), ("title.md", self.front_title)]
            .into_iter()
            .filter_map(|(name, content)| content.map(|c| ExportFileNode::file(name, c)))
            .collect();
        if !front.is_empty() {
            children.push(ExportFileNode::folder("front", front));
        }

        Ok(ExportFileNode::folder(ROOT_FOLDER, children))
    }
}

/// Story file name inside the archive; unlike single-story downloads it is
/// not zero-padded.
pub fn story_file_name(num: u32) -> String {
    format!("{num}.md")
}

/// Build the archive tree for an OBS book.
///
/// Untranslated stories, and stories that render to nothing, are left out.
pub fn build_archive(book: &Book, config: &MarkdownConfig) -> Result<ExportFileNode> {
    let mut builder = ArchiveBuilder::new();

    for chapter in &book.chapters {
        let Some(text) = &chapter.text else {
            log::debug!("skipping untranslated story {}", chapter.num);
            continue;
        };
        let markdown = chapter_to_markdown(text, chapter.num, config);
        if markdown.is_empty() {
            log::debug!("story {} rendered empty, leaving it out", chapter.num);
            continue;
        }
        builder = builder.story(chapter.num, markdown);
    }

    if let Some(back) = book.obs_back() {
        builder = builder.back_intro(back);
    }
    if let Some(intro) = book.obs_intro() {
        builder = builder.front_intro(intro);
    }
    if let Some(title) = book.obs_title() {
        builder = builder.front_title(title);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_only_book() {
        let tree = ArchiveBuilder::new().front_title("OBS").build().unwrap();
        let ExportFileNode::Folder { name, children } = &tree else {
            panic!("root must be a folder");
        };
        assert_eq!(name, "content");
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0],
            ExportFileNode::folder("front", vec![ExportFileNode::file("title.md", "OBS")])
        );
    }

    #[test]
    fn test_front_folder_is_merged() {
        let tree = ArchiveBuilder::new()
            .front_intro("intro")
            .front_title("title")
            .back_intro("back")
            .build()
            .unwrap();
        let names: Vec<&str> = match &tree {
            ExportFileNode::Folder { children, .. } => children.iter().map(|c| c.name()).collect(),
            ExportFileNode::File { .. } => unreachable!(),
        };
        assert_eq!(names, vec!["back", "front"]);
        assert!(tree.find("front/intro.md").is_some());
        assert!(tree.find("front/title.md").is_some());
    }

    #[test]
    fn test_duplicate_story_is_rejected() {
        let result = ArchiveBuilder::new().story(3, "a").story(3, "b").build();
        assert!(matches!(result, Err(Error::DuplicateChapter(3))));
    }

    #[test]
    fn test_files_lists_paths() {
        let tree = ArchiveBuilder::new()
            .story(1, "one")
            .story(12, "twelve")
            .back_intro("back")
            .build()
            .unwrap();
        let files = tree.files();
        assert_eq!(
            files,
            vec![
                ("content/1.md".to_string(), "one"),
                ("content/12.md".to_string(), "twelve"),
                ("content/back/intro.md".to_string(), "back"),
            ]
        );
    }

    #[test]
    fn test_json_shape() {
        let tree = ExportFileNode::folder("front", vec![ExportFileNode::file("title.md", "OBS")]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "front",
                "isFolder": true,
                "content": [{ "name": "title.md", "isFolder": false, "content": "OBS" }]
            })
        );
        let back: ExportFileNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_folder_with_text_content_is_rejected() {
        let json = r#"{"name": "front", "isFolder": true, "content": "oops"}"#;
        assert!(serde_json::from_str::<ExportFileNode>(json).is_err());
    }
}

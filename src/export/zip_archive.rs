//! Zip serialization of export archives.

use std::io::{Cursor, Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};
use crate::markdown::MarkdownConfig;
use crate::model::Book;

use super::Exporter;
use super::archive::{ExportFileNode, build_archive};

/// Configuration for zip output.
#[derive(Debug, Clone, Default)]
pub struct ZipConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

/// Write an archive tree as a zip file.
///
/// Folder names become path prefixes and the root folder is the top-level
/// directory. Every folder gets an explicit directory entry so empty ones
/// survive. Names must be non-empty and free of path separators.
pub fn serialize_archive<W: Write + Seek>(
    node: &ExportFileNode,
    writer: W,
    config: &ZipConfig,
) -> Result<()> {
    let mut zip = ZipWriter::new(writer);

    let compression_level = config.compression_level.unwrap_or(6).min(9);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level as i64));

    write_node(&mut zip, node, "", options)?;
    zip.finish()?;
    Ok(())
}

/// Serialize an archive tree into an in-memory zip.
pub fn archive_to_bytes(node: &ExportFileNode, config: &ZipConfig) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    serialize_archive(node, &mut cursor, config)?;
    Ok(cursor.into_inner())
}

fn write_node<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    node: &ExportFileNode,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let name = node.name();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::InvalidFileName(name.to_string()));
    }
    let path = format!("{prefix}{name}");

    match node {
        ExportFileNode::File { content, .. } => {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(content.as_bytes())?;
        }
        ExportFileNode::Folder { children, .. } => {
            let dir = format!("{path}/");
            zip.add_directory(dir.as_str(), options)?;
            for child in children {
                write_node(zip, child, &dir, options)?;
            }
        }
    }
    Ok(())
}

/// Exports an OBS book as a zip of Markdown stories.
///
/// # Example
///
/// ```no_run
/// use scriptura::export::{Exporter, ZipExporter};
/// use scriptura::model::Book;
/// use std::fs::File;
///
/// let book: Book = serde_json::from_str(&std::fs::read_to_string("obs.json")?)?;
/// let mut file = File::create("obs.zip")?;
/// ZipExporter::new().export(&book, &mut file)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZipExporter {
    config: ZipConfig,
    markdown: MarkdownConfig,
}

impl ZipExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ZipConfig) -> Self {
        self.config = config;
        self
    }

    /// Markdown settings for the story files.
    pub fn with_markdown(mut self, markdown: MarkdownConfig) -> Self {
        self.markdown = markdown;
        self
    }
}

impl Exporter for ZipExporter {
    fn export<W: Write + Seek>(&self, book: &Book, writer: &mut W) -> Result<()> {
        let tree = build_archive(book, &self.markdown)?;
        serialize_archive(&tree, writer, &self.config)
    }
}

//! Download file names.

use crate::model::{Book, Project, canon};

use super::{DownloadFormat, ExportScope};

/// PDF name fallback for scripture books without `toc1`.
pub const DEFAULT_BOOK_NAME: &str = "Book";
/// Zip name fallback for OBS books without a title.
pub const DEFAULT_ARCHIVE_NAME: &str = "obs";
/// PDF name fallback for OBS books without a title.
pub const DEFAULT_OBS_NAME: &str = "OpenBibleStories";

/// File name offered for a download.
///
/// - TXT: `{project}_{toc1}_chapter_{n}.txt`
/// - Markdown: `{nn}.md`
/// - USFM: the canonical `NN-CODE.usfm` (`{CODE}.usfm` for unknown codes)
/// - Zip: `{obs title}.zip`
/// - PDF: `{project}_{toc1 or obs title}.pdf`
pub fn download_file_name(
    format: DownloadFormat,
    scope: ExportScope,
    project: &Project,
    book: &Book,
) -> String {
    let chapter = scope.chapter().unwrap_or_default();
    let toc1 = book.toc1().unwrap_or(&book.code);

    let name = match format {
        DownloadFormat::Txt => format!("{}_{toc1}_chapter_{chapter}.txt", project.title),
        DownloadFormat::Markdown => format!("{chapter:02}.md"),
        DownloadFormat::Usfm => canon::usfm_file_name(&book.code)
            .unwrap_or_else(|| format!("{}.usfm", book.code.trim().to_ascii_uppercase())),
        DownloadFormat::Zip => format!("{}.zip", book.obs_title().unwrap_or(DEFAULT_ARCHIVE_NAME)),
        DownloadFormat::Pdf => {
            let title = if project.is_obs() {
                book.obs_title().unwrap_or(DEFAULT_OBS_NAME)
            } else {
                book.toc1().unwrap_or(DEFAULT_BOOK_NAME)
            };
            format!("{}_{title}.pdf", project.title)
        }
    };
    sanitize(&name)
}

/// Path separators and control characters cannot appear in a download name.
fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

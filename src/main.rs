//! scriptura - scripture download converter

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use scriptura::compile::{Labels, LayoutOptions};
use scriptura::export::{DownloadFormat, ExportPayload, ExportRequest, ExportScope, export};
use scriptura::markdown::{MarkdownConfig, markdown_to_chapter};
use scriptura::model::{Book, Project, VerseObject};
use scriptura::render::{RenderOptions, render_verse_text};
use scriptura::usfm::usfm_to_chapters;
use scriptura::util::{decode_text, read_json};

#[derive(Parser)]
#[command(name = "scriptura")]
#[command(version, about = "Scripture markup converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    scriptura text verse.json                              Print a verse as plain text
    scriptura export -p project.json -b gen.json -f usfm   Write 01-GEN.usfm
    scriptura export -p obs.json -b obs.json -f markdown -c 1
    scriptura import-usfm 01-GEN.usfm -o gen.json         USFM to book JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Encoding to try when an input file is not UTF-8
    #[arg(long, global = true, value_name = "LABEL")]
    encoding: Option<String>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print a verse (JSON array of verse objects) as plain text
    Text {
        #[arg(value_name = "VERSE_JSON")]
        input: PathBuf,

        /// Dump unsupported nodes as /tag content tag/
        #[arg(long)]
        show_unsupported: bool,
    },

    /// Produce a download artifact from project and book JSON
    Export {
        #[arg(short, long, value_name = "PROJECT_JSON")]
        project: PathBuf,

        /// Book JSON including its chapters
        #[arg(short, long, value_name = "BOOK_JSON")]
        book: PathBuf,

        /// pdf, txt, markdown, usfm or zip
        #[arg(short, long)]
        format: DownloadFormat,

        /// Chapter number; omit to export the whole book
        #[arg(short, long)]
        chapter: Option<u32>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        #[arg(long)]
        no_images: bool,
        #[arg(long)]
        no_front: bool,
        #[arg(long)]
        no_intro: bool,
        #[arg(long)]
        no_back: bool,

        /// Localized labels for title, reference and chapter
        #[arg(long, num_args = 3, value_names = ["TITLE", "REFERENCE", "CHAPTER"])]
        labels: Option<Vec<String>>,

        /// Dump unsupported nodes as /tag content tag/
        #[arg(long)]
        show_unsupported: bool,
    },

    /// Convert a USFM book to book JSON
    ImportUsfm {
        #[arg(value_name = "USFM")]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an OBS Markdown story to chapter JSON
    ImportMarkdown {
        #[arg(value_name = "MARKDOWN")]
        input: PathBuf,

        /// Story number
        #[arg(short, long, default_value_t = 1)]
        num: u32,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> scriptura::Result<()> {
    let encoding = cli.encoding.as_deref();

    match &cli.command {
        Command::Text {
            input,
            show_unsupported,
        } => {
            let nodes: Vec<VerseObject> = read_json(&fs::read(input)?, encoding)?;
            println!("{}", render_verse_text(&nodes, *show_unsupported));
        }
        Command::Export {
            project,
            book,
            format,
            chapter,
            out_dir,
            no_images,
            no_front,
            no_intro,
            no_back,
            labels,
            show_unsupported,
        } => {
            let project: Project = read_json(&fs::read(project)?, encoding)?;
            let book: Book = read_json(&fs::read(book)?, encoding)?;
            let scope = chapter.map_or(ExportScope::Book, ExportScope::Chapter);

            let mut request = ExportRequest::new(&project, &book, *format, scope);
            let defaults = request.layout;
            request = request
                .with_layout(LayoutOptions {
                    with_images: defaults.with_images && !no_images,
                    with_front: defaults.with_front && !no_front,
                    with_intro: defaults.with_intro && !no_intro,
                    with_back: defaults.with_back && !no_back,
                })
                .with_render(RenderOptions {
                    show_unsupported: *show_unsupported,
                })
                .with_markdown(MarkdownConfig {
                    with_images: !no_images,
                    show_unsupported: *show_unsupported,
                    ..Default::default()
                });
            if let Some([title, reference, chapter]) = labels.as_deref() {
                request = request.with_labels(Labels::new(title, reference, chapter));
            }

            let artifact = export(&request)?;
            let path = out_dir.join(&artifact.file_name);
            if let ExportPayload::Pdf { layout, .. } = &artifact.payload {
                log::info!("PDF layout for the renderer: {layout:?}");
            }
            fs::write(&path, artifact.into_bytes())?;
            println!("{}", path.display());
        }
        Command::ImportUsfm { input, output } => {
            let bytes = fs::read(input)?;
            let book = usfm_to_chapters(&decode_text(&bytes, encoding))?.into_book();
            write_output(output.as_deref(), &serde_json::to_string_pretty(&book)?)?;
        }
        Command::ImportMarkdown { input, num, output } => {
            let bytes = fs::read(input)?;
            let text = markdown_to_chapter(&decode_text(&bytes, encoding));
            let chapter = scriptura::Chapter::new(*num, text);
            write_output(output.as_deref(), &serde_json::to_string_pretty(&chapter)?)?;
        }
    }
    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> scriptura::Result<()> {
    match path {
        Some(path) => fs::write(path, content)?,
        None => println!("{content}"),
    }
    Ok(())
}

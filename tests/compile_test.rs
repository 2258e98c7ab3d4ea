//! Chapter and book compilation tests.

use scriptura::compile::{
    ChapterSource, CompileFormat, CompileOptions, FrontPage, Labels, LayoutOptions,
    compile_book, compile_chapter,
};
use scriptura::markdown::ObsImages;
use scriptura::model::{
    Book, Chapter, ChapterText, ObsProperties, Project, ProjectType, ScriptureProperties, Verse,
    VerseObject,
};

fn genesis_one() -> ChapterText {
    serde_json::from_str(
        r#"{
            "front": "ignored",
            "1": [
                {"type": "text", "text": "In the beginning "},
                {"type": "word", "text": "God", "strong": "H0430"},
                {"type": "text", "text": " created the heavens and the earth."}
            ],
            "2": "The earth was without form.",
            "3": null
        }"#,
    )
    .unwrap()
}

fn genesis_book() -> Book {
    Book::new("gen")
        .with_scripture(ScriptureProperties {
            toc1: Some("Genesis".to_string()),
            chapter_label: Some("Глава".to_string()),
            ..Default::default()
        })
        .with_chapters(vec![
            Chapter::new(1, genesis_one()),
            Chapter::untranslated(2),
            Chapter::new(3, ChapterText::from_verses(vec![Verse::plain(1, "Now the serpent")])),
        ])
}

// ============================================================================
// Chapter
// ============================================================================

#[test]
fn test_absent_chapter_compiles_to_empty() {
    for format in [CompileFormat::Txt, CompileFormat::Html, CompileFormat::Pdf] {
        let options = CompileOptions {
            format,
            ..Default::default()
        };
        assert_eq!(compile_chapter(None, &options), "");
        let untranslated = ChapterSource::new(4, None);
        assert_eq!(compile_chapter(Some(&untranslated), &options), "");
    }
}

#[test]
fn test_txt_chapter() {
    let text = genesis_one();
    let source = ChapterSource::new(1, Some(&text)).with_title("Project\nGenesis\nChapter 1");
    let out = compile_chapter(Some(&source), &CompileOptions::default());
    assert_eq!(
        out,
        "Project\nGenesis\nChapter 1\n\n\
         1 In the beginning God created the heavens and the earth.\n\
         2 The earth was without form.\n"
    );
}

#[test]
fn test_pseudo_verses_use_caller_labels() {
    let text = ChapterText::from_verses(vec![
        Verse::plain(200, "Genesis 1-2"),
        Verse::plain(0, "The Creation"),
        Verse::plain(1, "God made everything."),
    ]);
    let source = ChapterSource::new(1, Some(&text));
    let options = CompileOptions {
        labels: Labels::new("Название", "Ссылка", "Глава"),
        ..Default::default()
    };
    assert_eq!(
        compile_chapter(Some(&source), &options),
        "Название The Creation\n1 God made everything.\nСсылка Genesis 1-2\n"
    );
}

#[test]
fn test_html_paragraph_breaks_become_blocks() {
    let text = ChapterText::from_verses(vec![Verse::new(
        1,
        vec![
            VerseObject::text("First"),
            VerseObject::paragraph(),
            VerseObject::text("Second"),
        ],
    )]);
    let source = ChapterSource::new(1, Some(&text));
    let options = CompileOptions {
        format: CompileFormat::Html,
        ..Default::default()
    };
    let html = compile_chapter(Some(&source), &options);
    assert!(html.contains("<sup class=\"verse-num\">1</sup> First</p>"));
    assert!(html.contains("<p>Second</p>"));
}

fn verse_ending_in_paragraph() -> ChapterText {
    ChapterText::from_verses(vec![
        Verse::new(
            1,
            vec![VerseObject::text("In the beginning."), VerseObject::paragraph()],
        ),
        Verse::plain(2, "The earth."),
        Verse::plain(3, "And God said."),
    ])
}

#[test]
fn test_txt_paragraph_at_verse_end_leaves_blank_line() {
    let text = verse_ending_in_paragraph();
    let source = ChapterSource::new(1, Some(&text));
    assert_eq!(
        compile_chapter(Some(&source), &CompileOptions::default()),
        "1 In the beginning.\n\n2 The earth.\n3 And God said.\n"
    );
}

#[test]
fn test_txt_paragraph_at_verse_start_leaves_blank_line() {
    let text = ChapterText::from_verses(vec![
        Verse::plain(1, "In the beginning."),
        Verse::new(2, vec![VerseObject::paragraph(), VerseObject::text("The earth.")]),
    ]);
    let source = ChapterSource::new(1, Some(&text)).with_title("Chapter 1");
    assert_eq!(
        compile_chapter(Some(&source), &CompileOptions::default()),
        "Chapter 1\n\n1 In the beginning.\n\n2 The earth.\n"
    );
}

#[test]
fn test_html_paragraph_at_verse_end_closes_block() {
    let text = verse_ending_in_paragraph();
    let source = ChapterSource::new(1, Some(&text));
    let options = CompileOptions {
        format: CompileFormat::Html,
        ..Default::default()
    };
    let html = compile_chapter(Some(&source), &options);
    assert!(html.contains("<p><sup class=\"verse-num\">1</sup> In the beginning.</p>\n"));
    assert!(html.contains(
        "<p><sup class=\"verse-num\">2</sup> The earth. <sup class=\"verse-num\">3</sup> And God said.</p>\n"
    ));
}

#[test]
fn test_html_paragraph_at_verse_start_opens_block() {
    let text = ChapterText::from_verses(vec![
        Verse::plain(1, "In the beginning."),
        Verse::new(2, vec![VerseObject::paragraph(), VerseObject::text("The earth.")]),
    ]);
    let source = ChapterSource::new(1, Some(&text));
    let options = CompileOptions {
        format: CompileFormat::Html,
        ..Default::default()
    };
    let html = compile_chapter(Some(&source), &options);
    assert!(html.contains("<p><sup class=\"verse-num\">1</sup> In the beginning.</p>\n"));
    assert!(html.contains("<p><sup class=\"verse-num\">2</sup> The earth.</p>\n"));
}

#[test]
fn test_txt_subtitle_follows_title() {
    let text = genesis_one();
    let source = ChapterSource::new(1, Some(&text))
        .with_title("Project\nGenesis\nГлава 1")
        .with_subtitle("Genesis Chapter 1");
    let out = compile_chapter(Some(&source), &CompileOptions::default());
    assert!(out.starts_with("Project\nGenesis\nГлава 1\nGenesis Chapter 1\n\n1 In the beginning"));
}

#[test]
fn test_pdf_chapter_with_front_page() {
    let text = genesis_one();
    let project = Project::new("ult", "Literal <Text>").with_language("en", "English");
    let book = genesis_book();
    let source = ChapterSource::new(1, Some(&text)).with_title("Глава 1");
    let options = CompileOptions {
        format: CompileFormat::Pdf,
        layout: LayoutOptions::chapter_defaults(),
        front: Some(FrontPage::from_metadata(&project, &book)),
        language: "en".to_string(),
        ..Default::default()
    };
    let html = compile_chapter(Some(&source), &options);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<html lang=\"en\">"));
    assert!(html.contains("Literal &lt;Text&gt;"));
    assert!(html.contains("class=\"front-page\""));
    assert!(html.contains("<h1 class=\"title\">Глава 1</h1>"));
}

#[test]
fn test_obs_frames_get_images() {
    let text = ChapterText::from_verses(vec![
        Verse::plain(0, "1. The Creation"),
        Verse::plain(1, "Frame one."),
        Verse::plain(2, "Frame two."),
    ]);
    let source = ChapterSource::new(1, Some(&text));
    let options = CompileOptions {
        format: CompileFormat::Html,
        layout: LayoutOptions::chapter_defaults(),
        obs: Some(ObsImages::default()),
        ..Default::default()
    };
    let html = compile_chapter(Some(&source), &options);
    assert!(html.contains("obs-en-01-01.jpg"));
    assert!(html.contains("obs-en-01-02.jpg"));
    assert!(!html.contains("obs-en-01-00.jpg"));
}

// ============================================================================
// Book
// ============================================================================

#[test]
fn test_txt_book_skips_untranslated_chapters() {
    let project = Project::new("ult", "Literal Text");
    let out = compile_book(&genesis_book(), &project, &CompileOptions::default());
    assert!(out.contains("Глава 1\n\n1 In the beginning"));
    assert!(out.contains("Глава 3\n\n1 Now the serpent"));
    assert!(!out.contains("Глава 2"));
}

#[test]
fn test_obs_book_layout_switches() {
    let project = Project::new("obs", "Stories").with_type(ProjectType::Obs);
    let book = Book::new("obs")
        .with_obs(ObsProperties {
            title: Some("Open Bible Stories".to_string()),
            intro: Some("# Intro\n\nWelcome.".to_string()),
            back: Some("# Back matter".to_string()),
        })
        .with_chapters(vec![Chapter::new(
            1,
            ChapterText::from_verses(vec![Verse::plain(1, "Frame.")]),
        )]);

    let mut options = CompileOptions {
        format: CompileFormat::Html,
        layout: LayoutOptions::book_defaults(),
        obs: Some(ObsImages::default()),
        ..Default::default()
    };
    let full = compile_book(&book, &project, &options);
    assert!(full.contains("class=\"front-page\""));
    assert!(full.contains("Welcome."));
    assert!(full.contains("Back matter"));

    options.layout = LayoutOptions {
        with_images: false,
        with_front: false,
        with_intro: false,
        with_back: false,
    };
    let bare = compile_book(&book, &project, &options);
    assert!(!bare.contains("front-page"));
    assert!(!bare.contains("Welcome."));
    assert!(!bare.contains("Back matter"));
    assert!(!bare.contains("<img"));
    assert!(bare.contains("Frame."));
}

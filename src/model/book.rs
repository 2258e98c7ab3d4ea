//! Book and project metadata used for titles, headers and file names.

use serde::{Deserialize, Serialize};

use super::chapter::Chapter;

/// Scripture book properties (`properties.scripture`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptureProperties {
    pub h: Option<String>,
    pub toc1: Option<String>,
    pub toc2: Option<String>,
    pub toc3: Option<String>,
    pub mt: Option<String>,
    pub chapter_label: Option<String>,
}

/// Open Bible Stories book properties (`properties.obs`), Markdown strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsProperties {
    pub title: Option<String>,
    pub intro: Option<String>,
    pub back: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookProperties {
    pub scripture: Option<ScriptureProperties>,
    pub obs: Option<ObsProperties>,
}

/// A book: its code, metadata and ordered chapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub code: String,
    #[serde(default)]
    pub properties: BookProperties,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_scripture(mut self, scripture: ScriptureProperties) -> Self {
        self.properties.scripture = Some(scripture);
        self
    }

    pub fn with_obs(mut self, obs: ObsProperties) -> Self {
        self.properties.obs = Some(obs);
        self
    }

    pub fn with_chapters(mut self, chapters: Vec<Chapter>) -> Self {
        self.chapters = chapters;
        self
    }

    pub fn chapter(&self, num: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.num == num)
    }

    /// `properties.scripture.toc1`, if set and non-empty.
    pub fn toc1(&self) -> Option<&str> {
        self.scripture().and_then(|s| non_empty(&s.toc1))
    }

    pub fn chapter_label(&self) -> Option<&str> {
        self.scripture().and_then(|s| non_empty(&s.chapter_label))
    }

    /// `properties.obs.title`, if set and non-empty.
    pub fn obs_title(&self) -> Option<&str> {
        self.obs().and_then(|o| non_empty(&o.title))
    }

    pub fn obs_intro(&self) -> Option<&str> {
        self.obs().and_then(|o| non_empty(&o.intro))
    }

    pub fn obs_back(&self) -> Option<&str> {
        self.obs().and_then(|o| non_empty(&o.back))
    }

    /// Display title: scripture `toc1`, falling back to the OBS title.
    pub fn title(&self) -> Option<&str> {
        self.toc1().or_else(|| self.obs_title())
    }

    pub fn scripture(&self) -> Option<&ScriptureProperties> {
        self.properties.scripture.as_ref()
    }

    pub fn obs(&self) -> Option<&ObsProperties> {
        self.properties.obs.as_ref()
    }
}

/// Treat empty strings like absent values.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Bible,
    Obs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub code: String,
    pub orig_name: String,
}

/// The translation project a book belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub code: String,
    pub title: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(alias = "languages")]
    pub language: Language,
}

impl Project {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = project_type;
        self
    }

    pub fn with_language(mut self, code: impl Into<String>, orig_name: impl Into<String>) -> Self {
        self.language = Language {
            code: code.into(),
            orig_name: orig_name.into(),
        };
        self
    }

    pub fn is_obs(&self) -> bool {
        self.project_type == ProjectType::Obs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_book_metadata() {
        let json = r#"{
            "code": "gen",
            "properties": {
                "scripture": {"toc1": "Genesis", "chapter_label": "Chapter", "h": ""}
            }
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.toc1(), Some("Genesis"));
        assert_eq!(book.chapter_label(), Some("Chapter"));
        assert_eq!(book.scripture().and_then(|s| non_empty(&s.h)), None);
        assert!(book.chapters.is_empty());
    }

    #[test]
    fn test_empty_obs_fields_are_absent() {
        let book = Book::new("obs").with_obs(ObsProperties {
            title: Some("Open Bible Stories".to_string()),
            intro: Some("  ".to_string()),
            back: None,
        });
        assert_eq!(book.obs_title(), Some("Open Bible Stories"));
        assert_eq!(book.obs_intro(), None);
        assert_eq!(book.obs_back(), None);
        assert_eq!(book.title(), Some("Open Bible Stories"));
    }

    #[test]
    fn test_decode_project_with_languages_alias() {
        let json = r#"{
            "code": "rlob",
            "title": "Russian Literal Open Bible",
            "type": "obs",
            "languages": {"code": "ru", "orig_name": "Русский"}
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert!(project.is_obs());
        assert_eq!(project.language.code, "ru");
        assert_eq!(project.language.orig_name, "Русский");
    }
}

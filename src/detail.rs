//! Title detail and chapter list loader
//!
//! Two sequential, dependent fetches scoped to one title id: the full title
//! record first, then its chapter feed. A title failure short-circuits the
//! chapter fetch and becomes the screen's combined error. A chapter-feed
//! failure after a successful title fetch is non-fatal: the title still
//! renders and the chapter list presents as unavailable, which is distinct
//! from a feed that legitimately returned no chapters.

use crate::api::{ChapterFeedOptions, MangaApi};
use crate::models::{Chapter, Title};
use crate::search::LoadPhase;

pub struct DetailLoader {
    title_id: String,
    languages: Vec<String>,
    phase: LoadPhase,
    title: Option<Title>,
    chapters: Vec<Chapter>,
    chapters_unavailable: bool,
    error: Option<String>,
}

impl DetailLoader {
    pub fn new(title_id: impl Into<String>) -> Self {
        Self {
            title_id: title_id.into(),
            languages: vec!["en".to_string()],
            phase: LoadPhase::Idle,
            title: None,
            chapters: Vec::new(),
            chapters_unavailable: false,
            error: None,
        }
    }

    /// Translated languages requested for the chapter feed.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn title_id(&self) -> &str {
        &self.title_id
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn title(&self) -> Option<&Title> {
        self.title.as_ref()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// True when the chapter feed failed while the title loaded fine. An
    /// empty `chapters()` with this flag unset means the title genuinely
    /// has no chapters.
    pub fn chapters_unavailable(&self) -> bool {
        self.chapters_unavailable
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Point the loader at another title. Prior state is cleared right
    /// away so the old record can never show under the new id while the
    /// fetch is in flight.
    pub fn set_title_id(&mut self, title_id: impl Into<String>) {
        self.title_id = title_id.into();
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = LoadPhase::Idle;
        self.title = None;
        self.chapters.clear();
        self.chapters_unavailable = false;
        self.error = None;
    }

    /// Start the two-step load: clears prior state and enters `Loading`.
    pub fn begin(&mut self) {
        self.reset();
        self.phase = LoadPhase::Loading;
    }

    /// First step succeeded.
    pub fn accept_title(&mut self, title: Title) {
        self.title = Some(title);
    }

    /// First step failed: the whole screen fails and the second step must
    /// not run.
    pub fn fail_title(&mut self, message: String) {
        self.title = None;
        self.chapters.clear();
        self.error = Some(message);
        self.phase = LoadPhase::Failed;
    }

    /// Second step succeeded (possibly with zero chapters).
    pub fn accept_chapters(&mut self, chapters: Vec<Chapter>) {
        self.chapters = chapters;
        self.chapters_unavailable = false;
        self.phase = LoadPhase::Ready;
    }

    /// Second step failed: degrade, do not fail the screen.
    pub fn fail_chapters(&mut self, message: String) {
        log::warn!(
            "chapter feed failed for title {}: {}",
            self.title_id,
            message
        );
        self.chapters.clear();
        self.chapters_unavailable = true;
        self.phase = LoadPhase::Ready;
    }

    /// Run both fetches in order against the API.
    pub async fn load(&mut self, api: &MangaApi) {
        self.begin();

        match api.title_detail(&self.title_id).await {
            Ok(title) => self.accept_title(title),
            Err(e) => {
                self.fail_title(e.to_string());
                return;
            }
        }

        let opts = ChapterFeedOptions {
            languages: self.languages.clone(),
            ..ChapterFeedOptions::default()
        };
        match api.chapter_feed(&self.title_id, &opts).await {
            Ok(page) => self.accept_chapters(page.items),
            Err(e) => self.fail_chapters(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(id: &str) -> Title {
        serde_json::from_str(&format!(
            r#"{{ "id": "{}", "attributes": {{ "title": {{ "en": "T" }} }} }}"#,
            id
        ))
        .unwrap()
    }

    fn chapter(id: &str) -> Chapter {
        serde_json::from_str(&format!(
            r#"{{ "id": "{}", "attributes": {{ "chapter": "1", "pages": 10 }} }}"#,
            id
        ))
        .unwrap()
    }

    #[test]
    fn happy_path_populates_both() {
        let mut loader = DetailLoader::new("t1");
        loader.begin();
        loader.accept_title(title("t1"));
        loader.accept_chapters(vec![chapter("c1"), chapter("c2")]);

        assert_eq!(loader.phase(), LoadPhase::Ready);
        assert!(loader.title().is_some());
        assert_eq!(loader.chapters().len(), 2);
        assert!(!loader.chapters_unavailable());
        assert!(loader.error().is_none());
    }

    #[test]
    fn title_failure_is_the_combined_error() {
        let mut loader = DetailLoader::new("t1");
        loader.begin();
        loader.fail_title("Manga not found".into());

        assert_eq!(loader.phase(), LoadPhase::Failed);
        assert!(loader.title().is_none());
        assert!(loader.chapters().is_empty());
        assert_eq!(loader.error(), Some("Manga not found"));
    }

    #[test]
    fn chapter_failure_keeps_title_and_degrades() {
        let mut loader = DetailLoader::new("t1");
        loader.begin();
        loader.accept_title(title("t1"));
        loader.fail_chapters("feed unavailable".into());

        assert_eq!(loader.phase(), LoadPhase::Ready);
        assert!(loader.title().is_some());
        assert!(loader.chapters().is_empty());
        assert!(loader.chapters_unavailable());
        // The combined error stays clear: the screen renders.
        assert!(loader.error().is_none());
    }

    #[test]
    fn empty_feed_is_not_unavailable() {
        let mut loader = DetailLoader::new("t1");
        loader.begin();
        loader.accept_title(title("t1"));
        loader.accept_chapters(vec![]);

        assert!(loader.chapters().is_empty());
        assert!(!loader.chapters_unavailable());
    }

    #[test]
    fn id_change_clears_prior_state() {
        let mut loader = DetailLoader::new("t1");
        loader.begin();
        loader.accept_title(title("t1"));
        loader.accept_chapters(vec![chapter("c1")]);

        loader.set_title_id("t2");
        assert_eq!(loader.title_id(), "t2");
        assert_eq!(loader.phase(), LoadPhase::Idle);
        assert!(loader.title().is_none());
        assert!(loader.chapters().is_empty());
        assert!(loader.error().is_none());
    }

    #[test]
    fn begin_clears_earlier_failure() {
        let mut loader = DetailLoader::new("t1");
        loader.begin();
        loader.fail_title("boom".into());

        loader.begin();
        assert_eq!(loader.phase(), LoadPhase::Loading);
        assert!(loader.error().is_none());
    }
}

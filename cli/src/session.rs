use std::fs;
use std::path::{Path, PathBuf};

use dreamweaver_core::{DreamError, DreamGateway, GenerationBackend};
use dreamweaver_journal::{decode_image, Dream, Journal};
use tracing::{debug, error, info};

/// Outcome of saving the current result to the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
    NothingToSave,
}

/// The in-progress dream plus the journal it can be saved to.
///
/// Generation takes `&mut self`, so a session never has two requests in flight.
#[derive(Debug)]
pub struct DreamSession<B> {
    themes: Vec<String>,
    image: Option<String>,
    narrative: Option<String>,
    /// Themes the current image and narrative were generated from
    generated_themes: Option<Vec<String>>,
    is_loading: bool,
    error: Option<String>,
    journal: Journal,
    gateway: DreamGateway<B>,
}

impl<B: GenerationBackend> DreamSession<B> {
    pub fn new(gateway: DreamGateway<B>, journal: Journal, themes: Vec<String>) -> Self {
        let mut session = Self {
            themes: Vec::new(),
            image: None,
            narrative: None,
            generated_themes: None,
            is_loading: false,
            error: None,
            journal,
            gateway,
        };
        session.set_themes(themes);
        session
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn narrative(&self) -> Option<&str> {
        self.narrative.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Image and narrative of the current result, when both are present.
    pub fn current(&self) -> Option<(&str, &str)> {
        match (&self.image, &self.narrative) {
            (Some(image), Some(narrative)) => Some((image, narrative)),
            _ => None,
        }
    }

    /// Adds a trimmed theme. Empty and already present themes are ignored.
    pub fn add_theme(&mut self, theme: &str) -> bool {
        let theme = theme.trim();
        if theme.is_empty() || self.themes.iter().any(|t| t == theme) {
            return false;
        }
        self.themes.push(theme.to_string());
        true
    }

    pub fn remove_theme(&mut self, theme: &str) -> bool {
        let before = self.themes.len();
        self.themes.retain(|t| t != theme.trim());
        self.themes.len() != before
    }

    /// Replaces the theme set, keeping first occurrences in order.
    pub fn set_themes(&mut self, themes: Vec<String>) {
        self.themes = normalize_themes(themes);
    }

    /// Themes behind the current result; unaffected by later theme edits.
    pub fn generated_themes(&self) -> Option<&[String]> {
        self.generated_themes.as_deref()
    }

    /// Generates a dream from the current theme set.
    pub async fn generate(&mut self) -> Result<(), DreamError> {
        let themes = self.themes.clone();
        self.request_generation(themes).await
    }

    /// Generates a dream for `themes`.
    ///
    /// Themes are trimmed and deduplicated before prompting, so the prompts
    /// and the saved record see the same list. On success the themes, image
    /// and narrative are replaced; on failure only the error message is set.
    /// Loading is always cleared on return.
    pub async fn request_generation(&mut self, themes: Vec<String>) -> Result<(), DreamError> {
        let themes = normalize_themes(themes);
        if themes.is_empty() {
            self.error = Some(DreamError::NoThemes.to_string());
            return Err(DreamError::NoThemes);
        }

        self.is_loading = true;
        self.error = None;
        self.image = None;
        self.narrative = None;
        self.generated_themes = None;

        let outcome = self.gateway.generate(&themes).await;
        self.is_loading = false;

        match outcome {
            Ok(dream) => {
                info!("Dream generated from {} themes", themes.len());
                self.themes = themes.clone();
                self.generated_themes = Some(themes);
                self.image = Some(dream.image);
                self.narrative = Some(dream.narrative);
                Ok(())
            }
            Err(e) => {
                error!("Dream generation failed: {}", e);
                self.error = Some(format!(
                    "Failed to generate dream. Please try again. Error: {}",
                    e
                ));
                Err(e)
            }
        }
    }

    pub fn is_current_saved(&self) -> bool {
        match self.current() {
            Some((image, narrative)) => self.journal.contains(&Dream::derive_id(narrative, image)),
            None => false,
        }
    }

    /// Saves the current result to the front of the journal.
    pub fn save_current(&mut self) -> SaveOutcome {
        let (Some((image, narrative)), Some(themes)) = (self.current(), &self.generated_themes)
        else {
            debug!("No completed dream to save");
            return SaveOutcome::NothingToSave;
        };
        let dream = Dream::new(themes.clone(), image.to_string(), narrative.to_string());
        if self.journal.save(dream) {
            SaveOutcome::Saved
        } else {
            SaveOutcome::AlreadySaved
        }
    }

    pub fn delete_dream(&mut self, id: &str) -> bool {
        self.journal.delete(id)
    }

    /// Deletes the dream at a 1-based journal position.
    pub fn delete_at(&mut self, position: usize) -> Option<Dream> {
        let dream = self.journal.at_position(position)?.clone();
        self.journal.delete(&dream.id);
        Some(dream)
    }

    /// Clears the current result and error; the journal is untouched.
    pub fn reset_current(&mut self) {
        self.image = None;
        self.narrative = None;
        self.generated_themes = None;
        self.error = None;
    }

    /// Writes the current image to `path`.
    pub fn export_current(&self, path: &Path) -> Result<PathBuf, DreamError> {
        let image = self
            .image
            .as_deref()
            .ok_or_else(|| DreamError::Storage("There is no dream to export yet.".to_string()))?;
        export_image(image, path, "dream")
    }
}

/// Trims themes, drops blank ones and keeps first occurrences in order.
pub fn normalize_themes(themes: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(themes.len());
    for theme in themes {
        let theme = theme.trim();
        if !theme.is_empty() && !normalized.iter().any(|t| t == theme) {
            normalized.push(theme.to_string());
        }
    }
    normalized
}

/// Decodes `image` and writes it to `path`.
///
/// When `path` is a directory the file is named `{stem}.{ext}` inside it.
pub fn export_image(image: &str, path: &Path, stem: &str) -> Result<PathBuf, DreamError> {
    let decoded = decode_image(image).map_err(|e| DreamError::Storage(e.to_string()))?;
    let target = if path.is_dir() {
        path.join(format!("{}.{}", stem, decoded.extension()))
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DreamError::Storage(e.to_string()))?;
        }
    }
    fs::write(&target, &decoded.bytes).map_err(|e| {
        DreamError::Storage(format!("Failed to write {}: {}", target.display(), e))
    })?;
    info!("Exported {} bytes to {}", decoded.bytes.len(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dreamweaver_core::{GeminiError, GeminiResult};
    use dreamweaver_journal::{FileJournalStore, InMemoryJournalStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    // "hi!" in base64
    const IMAGE: &str = "data:image/png;base64,aGkh";
    const NARRATIVE: &str = "You rest on a floating island.";

    #[derive(Default)]
    struct FakeBackend {
        fail_image: bool,
        fail_text: bool,
        calls: AtomicUsize,
        narrative_prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        async fn generate_image(&self, _prompt: &str) -> GeminiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_image {
                return Err(GeminiError::ResponseError("No image was generated.".to_string()));
            }
            Ok(IMAGE.to_string())
        }

        async fn generate_narrative(&self, prompt: &str) -> GeminiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.narrative_prompts.lock().unwrap().push(prompt.to_string());
            if self.fail_text {
                return Err(GeminiError::RequestError("offline".to_string()));
            }
            Ok(NARRATIVE.to_string())
        }
    }

    fn session_with(backend: Arc<FakeBackend>) -> DreamSession<Arc<FakeBackend>> {
        DreamSession::new(
            DreamGateway::new(backend),
            Journal::open(InMemoryJournalStore::new()),
            Vec::new(),
        )
    }

    fn themes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_theme_editing_rejects_blank_and_duplicates() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        assert!(session.add_theme("  Neon desert "));
        assert!(!session.add_theme("Neon desert"));
        assert!(!session.add_theme("   "));
        assert!(session.add_theme("Crystal caves"));
        assert_eq!(session.themes(), ["Neon desert", "Crystal caves"]);
        assert!(session.remove_theme("Neon desert"));
        assert!(!session.remove_theme("Neon desert"));

        session.set_themes(themes(&["a", "b", "a"]));
        assert_eq!(session.themes(), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_themes_rejected_without_remote_calls() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = session_with(backend.clone());

        let result = session.request_generation(Vec::new()).await;
        assert_eq!(result, Err(DreamError::NoThemes));
        assert_eq!(
            session.error(),
            Some("Please add at least one theme to design your dream.")
        );
        assert!(!session.is_loading());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_generation_populates_result() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        session
            .request_generation(themes(&["Floating island", "Dragonfruit sky"]))
            .await
            .unwrap();

        assert_eq!(session.current(), Some((IMAGE, NARRATIVE)));
        assert_eq!(session.themes(), ["Floating island", "Dragonfruit sky"]);
        assert!(!session.is_loading());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_partial_failure_shows_nothing() {
        for (fail_image, fail_text, expected) in [
            (true, false, DreamError::ImageService),
            (false, true, DreamError::TextService),
        ] {
            let mut session = session_with(Arc::new(FakeBackend {
                fail_image,
                fail_text,
                ..Default::default()
            }));
            let result = session.request_generation(themes(&["Whispering statues"])).await;

            assert_eq!(result, Err(expected.clone()));
            assert!(session.image().is_none());
            assert!(session.narrative().is_none());
            assert!(!session.is_loading());
            let message = session.error().unwrap();
            assert!(message.starts_with("Failed to generate dream. Please try again. Error: "));
            assert!(message.ends_with(&expected.to_string()));
        }
    }

    #[tokio::test]
    async fn test_failure_clears_previous_result() {
        let backend = Arc::new(FakeBackend {
            fail_text: true,
            ..Default::default()
        });
        let mut session = session_with(backend);
        session.image = Some(IMAGE.to_string());
        session.narrative = Some(NARRATIVE.to_string());

        assert!(session.generate().await.is_err());
        // generate() on an empty theme list never reaches the backend
        assert!(session.current().is_some());

        session.add_theme("Singing flowers");
        assert!(session.generate().await.is_err());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_save_twice_keeps_one_entry() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        assert_eq!(session.save_current(), SaveOutcome::NothingToSave);

        session.request_generation(themes(&["Floating island"])).await.unwrap();
        assert!(!session.is_current_saved());
        assert_eq!(session.save_current(), SaveOutcome::Saved);
        assert_eq!(session.save_current(), SaveOutcome::AlreadySaved);
        assert!(session.is_current_saved());
        assert_eq!(session.journal().len(), 1);
    }

    #[tokio::test]
    async fn test_save_then_delete_scenario() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        session.request_generation(themes(&["Floating island"])).await.unwrap();
        session.save_current();

        let saved = &session.journal().dreams()[0];
        assert_eq!(saved.themes, ["Floating island"]);
        assert_eq!(saved.image, IMAGE);
        assert_eq!(saved.narrative, NARRATIVE);

        let id = saved.id.clone();
        assert!(!session.delete_dream("unknown"));
        assert_eq!(session.journal().len(), 1);
        assert!(session.delete_dream(&id));
        assert!(session.journal().is_empty());
    }

    #[tokio::test]
    async fn test_saved_themes_are_the_generated_ones() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        session.request_generation(themes(&["Floating island"])).await.unwrap();

        assert!(session.add_theme("Neon desert"));
        assert!(session.remove_theme("Floating island"));
        assert_eq!(session.save_current(), SaveOutcome::Saved);
        assert_eq!(session.journal().dreams()[0].themes, ["Floating island"]);
        assert_eq!(session.generated_themes(), Some(&["Floating island".to_string()][..]));
    }

    #[tokio::test]
    async fn test_save_with_every_theme_removed_keeps_generated_themes() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        session
            .request_generation(themes(&["Crystal caves", "Singing flowers"]))
            .await
            .unwrap();
        session.set_themes(Vec::new());

        session.save_current();
        assert_eq!(
            session.journal().dreams()[0].themes,
            ["Crystal caves", "Singing flowers"]
        );
    }

    #[tokio::test]
    async fn test_themes_normalized_before_prompting() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = session_with(backend.clone());
        session
            .request_generation(themes(&["a", " a ", "", "b"]))
            .await
            .unwrap();

        let prompts = backend.narrative_prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("themes: a, b."));
        assert_eq!(session.themes(), ["a", "b"]);

        session.save_current();
        assert_eq!(session.journal().dreams()[0].themes, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_blank_only_themes_rejected_without_remote_calls() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = session_with(backend.clone());
        assert_eq!(
            session.request_generation(themes(&["  ", ""])).await,
            Err(DreamError::NoThemes)
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reset_keeps_journal() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        session.request_generation(themes(&["Crystal caves"])).await.unwrap();
        session.save_current();
        session.reset_current();

        assert!(session.current().is_none());
        assert!(session.generated_themes().is_none());
        assert_eq!(session.save_current(), SaveOutcome::NothingToSave);
        assert!(session.error().is_none());
        assert_eq!(session.journal().len(), 1);
        assert_eq!(session.themes(), ["Crystal caves"]);
    }

    #[tokio::test]
    async fn test_journal_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");
        let backend = Arc::new(FakeBackend::default());

        let mut session = DreamSession::new(
            DreamGateway::new(backend.clone()),
            Journal::open(FileJournalStore::new(&path)),
            themes(&["Neon desert"]),
        );
        session.generate().await.unwrap();
        session.save_current();
        let expected = session.journal().dreams().to_vec();

        let restarted = DreamSession::new(
            DreamGateway::new(backend),
            Journal::open(FileJournalStore::new(&path)),
            Vec::new(),
        );
        assert_eq!(restarted.journal().dreams(), expected.as_slice());
    }

    #[tokio::test]
    async fn test_delete_at_position() {
        let mut session = session_with(Arc::new(FakeBackend::default()));
        session.request_generation(themes(&["Floating island"])).await.unwrap();
        session.save_current();
        assert!(session.delete_at(2).is_none());
        assert!(session.delete_at(1).is_some());
        assert!(session.journal().is_empty());
    }

    #[tokio::test]
    async fn test_export_current_into_directory() {
        let dir = tempdir().unwrap();
        let mut session = session_with(Arc::new(FakeBackend::default()));
        let err = session.export_current(dir.path()).unwrap_err();
        assert!(matches!(err, DreamError::Storage(_)));
        assert_eq!(
            err.to_string(),
            "Dream storage error: There is no dream to export yet."
        );
        assert!(matches!(
            export_image("not a data uri", dir.path(), "broken"),
            Err(DreamError::Storage(_))
        ));

        session.request_generation(themes(&["Floating island"])).await.unwrap();
        let written = session.export_current(dir.path()).unwrap();
        assert_eq!(written, dir.path().join("dream.png"));
        assert_eq!(fs::read(&written).unwrap(), b"hi!");
    }
}

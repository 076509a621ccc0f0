use async_trait::async_trait;
use tracing::{error, info};

use crate::errors::{DreamError, GeminiResult};
use crate::prompts::{image_prompt, narrative_prompt};

/// The two remote synthesis calls a dream needs.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns an embeddable image reference (`data:` URI) for the prompt.
    async fn generate_image(&self, prompt: &str) -> GeminiResult<String>;

    /// Returns the narrative text for the prompt.
    async fn generate_narrative(&self, prompt: &str) -> GeminiResult<String>;
}

#[async_trait]
impl<T: GenerationBackend + ?Sized> GenerationBackend for std::sync::Arc<T> {
    async fn generate_image(&self, prompt: &str) -> GeminiResult<String> {
        (**self).generate_image(prompt).await
    }

    async fn generate_narrative(&self, prompt: &str) -> GeminiResult<String> {
        (**self).generate_narrative(prompt).await
    }
}

/// A completed generation: both artifacts are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDream {
    pub image: String,
    pub narrative: String,
}

/// Issues the image and narrative requests for a theme set and folds
/// their outcomes into a single result.
#[derive(Debug, Clone)]
pub struct DreamGateway<B> {
    backend: B,
}

impl<B: GenerationBackend> DreamGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Generates an image and a narrative for `themes`.
    ///
    /// Both requests are in flight together and the first failure wins;
    /// a failed call never yields a partial result.
    pub async fn generate(&self, themes: &[String]) -> Result<GeneratedDream, DreamError> {
        if themes.is_empty() {
            return Err(DreamError::NoThemes);
        }

        info!(themes = themes.len(), "Generating dream");
        let image_prompt = image_prompt(themes);
        let narrative_prompt = narrative_prompt(themes);

        let image = async {
            self.backend
                .generate_image(&image_prompt)
                .await
                .map_err(|e| {
                    error!("Error generating image: {}", e);
                    DreamError::ImageService
                })
        };
        let narrative = async {
            self.backend
                .generate_narrative(&narrative_prompt)
                .await
                .map_err(|e| {
                    error!("Error generating narrative: {}", e);
                    DreamError::TextService
                })
        };

        let (image, narrative) = tokio::try_join!(image, narrative)?;
        Ok(GeneratedDream { image, narrative })
    }
}

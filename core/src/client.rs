use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::{DreamConfig, DEFAULT_API_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::errors::{GeminiError, GeminiResult};
use crate::gateway::GenerationBackend;
use crate::types::*;

/// Client for interacting with the Gemini text and Imagen image APIs
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: DreamConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(config: DreamConfig) -> GeminiResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            GeminiError::ConfigError(
                "API key is required to initialize the Gemini client (set GEMINI_API_KEY)"
                    .to_string(),
            )
        })?;

        let client = Client::new();

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn base_url(&self) -> &str {
        self.config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    fn text_model(&self) -> &str {
        self.config.text_model.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    fn image_model(&self) -> &str {
        self.config
            .image_model
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    /// POST a JSON body to `{base}/models/{model}:{method}` and decode the reply
    async fn post_model<Req, Resp>(&self, model: &str, method: &str, body: &Req) -> GeminiResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/models/{}:{}", self.base_url(), model, method);
        debug!(model, method, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| GeminiError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                GeminiError::ResponseError(format!("Failed to read error response: {}", e))
            })?;

            return Err(GeminiError::HttpError {
                status_code: status.as_u16(),
                message: format!("API request failed: {}", error_body),
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| GeminiError::ParsingError(format!("Failed to parse response: {}", e)))
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        self.post_model(self.text_model(), "generateContent", &request)
            .await
    }

    /// Generate images using the Imagen API
    pub async fn generate_images(
        &self,
        request: GenerateImagesRequest,
    ) -> GeminiResult<GenerateImagesResponse> {
        self.post_model(self.image_model(), "predict", &request).await
    }

    /// Builds the narrative request: narrator persona plus sampling parameters.
    pub fn create_narrative_request(&self, prompt: &str) -> GenerateContentRequest {
        let system_instruction = self.config.system_prompt.as_ref().map(|prompt| Content {
            parts: vec![Part::text(prompt.clone())],
            role: None,
        });

        let user_content = Content {
            parts: vec![Part::text(prompt.to_string())],
            role: Some("user".to_string()),
        };

        GenerateContentRequest {
            contents: vec![user_content],
            system_instruction,
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            }),
        }
    }

    /// Builds the single-image request with the configured aspect ratio.
    pub fn create_image_request(&self, prompt: &str) -> GenerateImagesRequest {
        let mut parameters = ImageParameters::default();
        if let Some(aspect_ratio) = &self.config.aspect_ratio {
            parameters.aspect_ratio = aspect_ratio.clone();
        }
        GenerateImagesRequest::new(prompt.to_string(), parameters)
    }

    /// Helper method to extract text from a response
    pub fn extract_text_from_response(response: &GenerateContentResponse) -> GeminiResult<String> {
        let candidate = response.candidates.first().ok_or_else(|| {
            GeminiError::ResponseError("No candidates in response".to_string())
        })?;

        let content = candidate
            .content
            .as_ref()
            .ok_or_else(|| GeminiError::ResponseError("No content in candidate".to_string()))?;

        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(GeminiError::ResponseError("No text in response".to_string()));
        }

        Ok(text.trim().to_string())
    }

    /// Encodes the first generated image as a `data:` URI.
    pub fn extract_image_from_response(response: &GenerateImagesResponse) -> GeminiResult<String> {
        let prediction = response
            .predictions
            .first()
            .ok_or_else(|| GeminiError::ResponseError("No image was generated.".to_string()))?;

        let bytes = prediction
            .bytes_base64_encoded
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| GeminiError::ResponseError("Image prediction has no data".to_string()))?;

        let mime_type = prediction.mime_type.as_deref().unwrap_or("image/jpeg");
        Ok(format!("data:{};base64,{}", mime_type, bytes))
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> GeminiResult<String> {
        let response = self.generate_images(self.create_image_request(prompt)).await?;
        Self::extract_image_from_response(&response)
    }

    async fn generate_narrative(&self, prompt: &str) -> GeminiResult<String> {
        let response = self
            .generate_content(self.create_narrative_request(prompt))
            .await?;
        Self::extract_text_from_response(&response)
    }
}

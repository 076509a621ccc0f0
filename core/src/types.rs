use serde::{Deserialize, Serialize};

/// Request to Gemini API to generate content
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content structure for requests and responses
#[derive(Serialize, Clone, Debug, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Part structure for a piece of content
#[derive(Serialize, Clone, Debug, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: String) -> Self {
        Self { text: Some(text) }
    }
}

/// Generation configuration options
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

/// Response from Gemini API
#[derive(Deserialize, Debug, Serialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate in the response
#[derive(Deserialize, Debug, Serialize)]
pub struct Candidate {
    pub content: Option<ContentResponsePart>,
}

/// Content part in the response
#[derive(Deserialize, Debug, Serialize)]
pub struct ContentResponsePart {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
    pub role: Option<String>,
}

/// Part response from the API
#[derive(Deserialize, Debug, Serialize)]
pub struct PartResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Request to the Imagen `predict` endpoint
#[derive(Serialize, Debug)]
pub struct GenerateImagesRequest {
    pub instances: Vec<ImagePromptInstance>,
    pub parameters: ImageParameters,
}

impl GenerateImagesRequest {
    /// Single-prompt request with the given parameters.
    pub fn new(prompt: String, parameters: ImageParameters) -> Self {
        Self {
            instances: vec![ImagePromptInstance { prompt }],
            parameters,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ImagePromptInstance {
    pub prompt: String,
}

/// Fixed image synthesis parameters
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub output_options: ImageOutputOptions,
}

impl Default for ImageParameters {
    fn default() -> Self {
        Self {
            sample_count: 1,
            aspect_ratio: "16:9".to_string(),
            output_options: ImageOutputOptions {
                mime_type: "image/jpeg".to_string(),
            },
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageOutputOptions {
    pub mime_type: String,
}

/// Response from the Imagen `predict` endpoint
#[derive(Deserialize, Debug, Default)]
pub struct GenerateImagesResponse {
    #[serde(default)]
    pub predictions: Vec<ImagePrediction>,
}

/// One generated image, base64 payload inline
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImagePrediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
}

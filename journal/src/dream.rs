use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{JournalError, JournalResult};

/// One saved generation result.
///
/// Field names match the journal slot written by earlier versions, so an
/// existing slot without `savedAt` still loads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dream {
    /// Identity of the dream: `narrative` followed by `image`
    pub id: String,
    /// `data:` URI of the generated image
    pub image: String,
    pub narrative: String,
    /// Themes the dream was generated from, in input order
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Dream {
    pub fn new(themes: Vec<String>, image: String, narrative: String) -> Self {
        Self {
            id: Self::derive_id(&narrative, &image),
            image,
            narrative,
            themes,
            saved_at: Some(Utc::now()),
        }
    }

    /// Two results are the same dream iff narrative and image both match.
    pub fn derive_id(narrative: &str, image: &str) -> String {
        let mut id = String::with_capacity(narrative.len() + image.len());
        id.push_str(narrative);
        id.push_str(image);
        id
    }
}

/// Raw image bytes recovered from a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Conventional file extension for the mime type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// Splits `data:<mime>;base64,<payload>` into mime type and bytes.
pub fn decode_image(data_uri: &str) -> JournalResult<DecodedImage> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| JournalError::InvalidImage("missing data: prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| JournalError::InvalidImage("missing payload separator".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| JournalError::InvalidImage("payload is not base64".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| JournalError::InvalidImage(format!("bad base64 payload: {}", e)))?;

    Ok(DecodedImage {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

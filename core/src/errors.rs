use thiserror::Error;

/// Gemini API errors
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },
}

/// Result type for Gemini operations
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Errors surfaced by the dream workflow.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DreamError {
    /// Generation was requested with an empty theme set.
    #[error("Please add at least one theme to design your dream.")]
    NoThemes,

    /// The image service failed or returned no image.
    #[error("Failed to connect to the visual cortex of the dream engine.")]
    ImageService,

    /// The text service failed or returned no narrative.
    #[error("The storyteller seems to be asleep. Could not generate narrative.")]
    TextService,

    /// Dream data on disk could not be read or written, including image
    /// exports.
    #[error("Dream storage error: {0}")]
    Storage(String),
}

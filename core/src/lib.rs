// Core dreamweaver functionality:
// - API client for the Gemini text and Imagen image services
// - Request/response data structures
// - Prompt construction and the generation gateway
// - Configuration loading
// - Shared error types

// Export client module - API client for Gemini/Imagen
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

pub mod prompts;

// Export gateway module - Concurrent image + narrative generation
pub mod gateway;
pub use gateway::{DreamGateway, GeneratedDream, GenerationBackend};

use crate::errors::{GeminiError, GeminiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "dreamweaver";

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

pub const DEFAULT_NARRATOR_PROMPT: &str = "You are a gentle dream weaver, crafting soothing and imaginative introductions to dreams. Your tone is calm, poetic, and reassuring. You speak in the second person (\"You are...\", \"You feel...\"). Start the narrative directly, without any preamble like \"Tonight, you will dream of...\". Keep it to 2-4 beautiful sentences.";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Configuration struct for dreamweaver
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DreamConfig {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub aspect_ratio: Option<String>,
    pub default_themes: Option<Vec<String>>,
    pub journal_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for DreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            text_model: Some(DEFAULT_TEXT_MODEL.to_string()),
            image_model: Some(DEFAULT_IMAGE_MODEL.to_string()),
            system_prompt: Some(DEFAULT_NARRATOR_PROMPT.to_string()),
            temperature: Some(0.8),
            top_p: Some(0.95),
            aspect_ratio: Some("16:9".to_string()),
            default_themes: Some(vec![
                "Floating island".to_string(),
                "Dragonfruit sky".to_string(),
                "Childhood home".to_string(),
            ]),
            journal_path: None,
            log_level: Some("warn".to_string()),
        }
    }
}

impl DreamConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> GeminiResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                GeminiError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                GeminiError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;

            // Fields missing from the file keep their defaults
            Ok(Self::default().merge(&config))
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> GeminiResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            GeminiError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GeminiError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            GeminiError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            api_base_url: other
                .api_base_url
                .clone()
                .or_else(|| self.api_base_url.clone()),
            text_model: other.text_model.clone().or_else(|| self.text_model.clone()),
            image_model: other.image_model.clone().or_else(|| self.image_model.clone()),
            system_prompt: other
                .system_prompt
                .clone()
                .or_else(|| self.system_prompt.clone()),
            temperature: other.temperature.or(self.temperature),
            top_p: other.top_p.or(self.top_p),
            aspect_ratio: other
                .aspect_ratio
                .clone()
                .or_else(|| self.aspect_ratio.clone()),
            default_themes: other
                .default_themes
                .clone()
                .or_else(|| self.default_themes.clone()),
            journal_path: other
                .journal_path
                .clone()
                .or_else(|| self.journal_path.clone()),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
        }
    }

    /// Fills `api_key` from the environment when the config does not carry one
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = API_KEY_ENV_VARS
                .iter()
                .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()));
        }
        self
    }

    /// Journal slot location, defaulting to `journal.json` next to the config file
    pub fn resolve_journal_path(&self) -> GeminiResult<PathBuf> {
        match &self.journal_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_default_config_dir(APP_NAME)?.join("journal.json")),
        }
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            Some(key) if key.chars().count() > 4 => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{}", tail)
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> GeminiResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        GeminiError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> GeminiResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}

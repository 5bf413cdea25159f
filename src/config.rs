//! read-to-me configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default Piper voice model path (.onnx)
    #[serde(default)]
    pub voice_model: Option<PathBuf>,

    /// Default language tag; zh* selects character-run chunking
    #[serde(default = "default_language")]
    pub language: String,

    /// Chunk-size override; None means the language-appropriate default
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            voice_model: None,
            language: default_language(),
            max_chunk_chars: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path: ~/.config/read-to-me/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(config_dir.join("read-to-me").join("config.toml"))
    }

    /// Load config from file, returning defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.voice_model.is_none());
        assert_eq!(config.language, "en-US");
        assert!(config.max_chunk_chars.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice_model = "/models/en_US-lessac-medium.onnx"
language = "zh-CN"
max_chunk_chars = 1200
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.voice_model,
            Some(PathBuf::from("/models/en_US-lessac-medium.onnx"))
        );
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.max_chunk_chars, Some(1200));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.language, "en-US");
        assert!(config.voice_model.is_none());
    }
}

//! Configuration management for medrag
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.medrag/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{RagError, Result};
use crate::pipeline::PipelineConfig;

/// Complete configuration for medrag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub reranker: RerankerConfig,
    pub pipeline: PipelineSettings,
    pub corpus: CorpusConfig,
}

/// Ollama connection configuration (embedding + generation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub embed_model: String,
    pub generate_model: String,
}

/// Cross-encoder reranker service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    pub url: String,
}

/// Retrieval depth and prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub k_coarse: usize,
    pub k_fine: usize,
    pub metaprompt: String,
}

/// Corpus file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub keys_path: String,
    pub values_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            reranker: RerankerConfig::default(),
            pipeline: PipelineSettings::default(),
            corpus: CorpusConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            embed_model: "bge-large".to_string(),
            generate_model: "llama3.1:8b".to_string(),
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8087".to_string(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            k_coarse: defaults.k_coarse,
            k_fine: defaults.k_fine,
            metaprompt: defaults.metaprompt,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            keys_path: "~/.medrag/corpus_embeddings.json".to_string(),
            values_path: "~/.medrag/corpus_text.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".medrag").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.k_fine == 0 {
            return Err(RagError::ConfigError(
                "k_fine must be at least 1".to_string(),
            ));
        }

        if self.pipeline.k_fine > self.pipeline.k_coarse {
            return Err(RagError::ConfigError(format!(
                "k_fine ({}) must not exceed k_coarse ({})",
                self.pipeline.k_fine, self.pipeline.k_coarse
            )));
        }

        if self.ollama.port == 0 {
            return Err(RagError::ConfigError(
                "ollama port must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RagError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RagError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Pipeline parameters in the form the pipeline consumes
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            k_coarse: self.pipeline.k_coarse,
            k_fine: self.pipeline.k_fine,
            metaprompt: self.pipeline.metaprompt.clone(),
        }
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Corpus key matrix path
    pub fn keys_path(&self) -> PathBuf {
        Self::expand_path(&self.corpus.keys_path)
    }

    /// Corpus text values path
    pub fn values_path(&self) -> PathBuf {
        Self::expand_path(&self.corpus.values_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.host, "127.0.0.1");
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.pipeline.k_coarse, 50);
        assert_eq!(config.pipeline.k_fine, 5);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_k_fine() {
        let mut config = Config::default();
        config.pipeline.k_fine = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_k_fine_above_k_coarse() {
        let mut config = Config::default();
        config.pipeline.k_fine = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ollama_url() {
        let config = Config::default();
        assert_eq!(config.ollama_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_pipeline_config_mirrors_settings() {
        let mut config = Config::default();
        config.pipeline.k_coarse = 20;
        config.pipeline.k_fine = 3;

        let pc = config.pipeline_config();
        assert_eq!(pc.k_coarse, 20);
        assert_eq!(pc.k_fine, 3);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path("~/.medrag");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let expanded = Config::expand_path("/absolute/path");
        assert_eq!(expanded.to_string_lossy(), "/absolute/path");
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.pipeline.k_coarse = 25;
        config.save(&path).unwrap();

        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.pipeline.k_coarse, 25);
    }
}

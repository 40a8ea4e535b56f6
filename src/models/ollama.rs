//! Ollama API clients for embedding and generation
//!
//! Embedding: POST /api/embed (batched input)
//! Generation: POST /api/generate (non-streaming)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::models::{Embedder, Generator};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Embedding requests are quick; generation can take much longer
const EMBED_TIMEOUT: Duration = Duration::from_secs(60);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Embedding client against an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(EMBED_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        })
    }

    /// Get the embedding model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::EmbeddingFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingFailed(format!("invalid response: {}", e)))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings)
    }
}

/// Generation client against an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        })
    }

    /// Get the generation model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check if the Ollama server is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::GenerationFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::GenerationFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::GenerationFailed(format!("invalid response: {}", e)))?;

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OllamaEmbedder::new(DEFAULT_OLLAMA_URL, "bge-large").unwrap();
        assert_eq!(embedder.model(), "bge-large");
        assert_eq!(embedder.base_url, DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn test_generator_creation() {
        let generator = OllamaGenerator::new("http://localhost:8080", "llama3.1:8b").unwrap();
        assert_eq!(generator.model(), "llama3.1:8b");
        assert_eq!(generator.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_embed_empty_batch_skips_request() {
        let embedder = OllamaEmbedder::new(DEFAULT_OLLAMA_URL, "bge-large").unwrap();
        let result = tokio_test::block_on(embedder.embed(&[]));
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_embed_integration() {
        let embedder = OllamaEmbedder::new(DEFAULT_OLLAMA_URL, "nomic-embed-text").unwrap();
        let embeddings = embedder
            .embed(&["hello world".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 1);
        assert!(!embeddings[0].is_empty());
    }
}

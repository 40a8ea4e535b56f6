//! Cross-encoder reranker client
//!
//! Talks to a text-embeddings-inference compatible service:
//! POST /rerank with a query and candidate texts, response is a list of
//! (index, score) entries. Scores are mapped back into candidate order
//! through the returned indices, since the service sorts by relevance.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::models::RelevanceScorer;

const RERANK_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for a cross-encoder rerank endpoint
#[derive(Debug, Clone)]
pub struct CrossEncoderClient {
    client: Client,
    base_url: String,
}

impl CrossEncoderClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(RERANK_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Get the service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RerankEntry {
    index: usize,
    score: f64,
}

#[async_trait]
impl RelevanceScorer for CrossEncoderClient {
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f64>> {
        let url = format!("{}/rerank", self.base_url);
        let request = RerankRequest {
            query,
            texts: candidates,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::ScoringFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::ScoringFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let entries: Vec<RerankEntry> = response
            .json()
            .await
            .map_err(|e| RagError::ScoringFailed(format!("invalid response: {}", e)))?;

        if entries.len() != candidates.len() {
            return Err(RagError::ScoringFailed(format!(
                "expected {} scores, got {}",
                candidates.len(),
                entries.len()
            )));
        }

        let mut scores = vec![None; candidates.len()];
        for entry in entries {
            let slot = scores.get_mut(entry.index).ok_or_else(|| {
                RagError::ScoringFailed(format!(
                    "score index {} out of range for {} candidates",
                    entry.index,
                    candidates.len()
                ))
            })?;
            *slot = Some(entry.score);
        }

        scores
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                s.ok_or_else(|| {
                    RagError::ScoringFailed(format!("missing score for candidate {}", i))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CrossEncoderClient::new("http://127.0.0.1:8087").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8087");
    }

    #[tokio::test]
    #[ignore] // Requires a reranker service running
    async fn test_score_integration() {
        let client = CrossEncoderClient::new("http://127.0.0.1:8087").unwrap();
        let scores = client
            .score(
                "what causes dysuria",
                &["chlamydia overview".to_string(), "lupus overview".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(scores.len(), 2);
    }
}

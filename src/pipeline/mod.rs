//! End-to-end retrieval pipeline: embed -> search -> rerank -> generate
//!
//! The pipeline is stateless orchestration over an immutable similarity
//! index and three external collaborators. No retries happen here; a
//! collaborator failure propagates as a typed error and the caller decides
//! whether to retry, fall back to no-evidence generation, or abort.

pub mod prompt;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{RagError, Result};
use crate::models::{Embedder, Generator, RelevanceScorer};
use crate::reranking::{Reranker, ScoredCandidate};
use crate::retrieval::{SearchHit, SimilarityIndex};

pub use prompt::build_prompt;

/// Pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Coarse retrieval depth (first-pass vector search)
    pub k_coarse: usize,
    /// Refined depth after reranking; evidence handed to the generator
    pub k_fine: usize,
    /// Instruction text prepended to every generation prompt
    pub metaprompt: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            k_coarse: 50,
            k_fine: 5,
            metaprompt: "Answer the question using the numbered reference passages below.\n"
                .to_string(),
        }
    }
}

/// Evidence selection strategy for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceMode {
    /// Generate from the query alone
    None,
    /// First k_fine passages from coarse retrieval, no reranking
    Coarse,
    /// Fully reranked evidence
    Reranked,
}

/// Answer from the full pipeline, with the evidence that grounded it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub query: String,
    pub answer: String,
    pub evidence: Vec<ScoredCandidate>,
}

/// Per-mode generations for evaluation, produced from a single
/// embed + coarse-search pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeComparison {
    pub query: String,
    pub coarse_hits: Vec<SearchHit>,
    pub reranked: Vec<ScoredCandidate>,
    pub no_evidence_answer: String,
    pub coarse_answer: String,
    pub reranked_answer: String,
}

/// Orchestrates retrieval, reranking, and generation over one corpus
pub struct RetrievalPipeline {
    index: Arc<SimilarityIndex>,
    embedder: Arc<dyn Embedder>,
    reranker: Reranker,
    generator: Arc<dyn Generator>,
    config: PipelineConfig,
}

impl RetrievalPipeline {
    /// Create a pipeline. Enforces `1 <= k_fine <= k_coarse <= N` up front.
    pub fn new(
        index: Arc<SimilarityIndex>,
        embedder: Arc<dyn Embedder>,
        scorer: Arc<dyn RelevanceScorer>,
        generator: Arc<dyn Generator>,
        config: PipelineConfig,
    ) -> Result<Self> {
        if config.k_fine == 0 || config.k_fine > config.k_coarse {
            return Err(RagError::InvalidK {
                k: config.k_fine,
                available: config.k_coarse,
            });
        }
        if config.k_coarse > index.len() {
            return Err(RagError::InvalidK {
                k: config.k_coarse,
                available: index.len(),
            });
        }

        Ok(Self {
            index,
            embedder,
            reranker: Reranker::new(scorer),
            generator,
            config,
        })
    }

    /// Embed the query and run coarse vector search once
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>> {
        let vectors = self.embedder.embed(&[query.to_string()]).await?;
        let qvec = vectors.into_iter().next().ok_or_else(|| {
            RagError::EmbeddingFailed("embedder returned no vectors".to_string())
        })?;

        let mut batches = self.index.search(&[qvec], self.config.k_coarse)?;
        Ok(batches.pop().unwrap_or_default())
    }

    /// Rerank coarse hits down to k_fine candidates
    pub async fn rerank_hits(
        &self,
        query: &str,
        coarse: &[SearchHit],
    ) -> Result<Vec<ScoredCandidate>> {
        let candidates: Vec<String> = coarse.iter().map(|hit| hit.text.clone()).collect();
        let mut outcomes = self
            .reranker
            .rerank(&[query.to_string()], &[candidates], self.config.k_fine)
            .await?;

        outcomes
            .pop()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Full pipeline: retrieve, rerank, generate a grounded answer
    pub async fn answer(&self, query: &str) -> Result<RagAnswer> {
        let coarse = self.retrieve(query).await?;
        let reranked = self.rerank_hits(query, &coarse).await?;

        let evidence: Vec<String> = reranked.iter().map(|c| c.text.clone()).collect();
        let answer = self.generate_with(query, &evidence).await?;

        Ok(RagAnswer {
            query: query.to_string(),
            answer,
            evidence: reranked,
        })
    }

    /// Generate with evidence selected by the given mode.
    ///
    /// `coarse` and `reranked` come from `retrieve` / `rerank_hits`, so the
    /// expensive stages run once however many modes are generated.
    pub async fn answer_with_mode(
        &self,
        query: &str,
        mode: EvidenceMode,
        coarse: &[SearchHit],
        reranked: &[ScoredCandidate],
    ) -> Result<String> {
        let evidence: Vec<String> = match mode {
            EvidenceMode::None => Vec::new(),
            EvidenceMode::Coarse => coarse
                .iter()
                .take(self.config.k_fine)
                .map(|hit| hit.text.clone())
                .collect(),
            EvidenceMode::Reranked => reranked.iter().map(|c| c.text.clone()).collect(),
        };
        self.generate_with(query, &evidence).await
    }

    /// Run all three evidence modes off a single embed + search pass
    pub async fn compare_modes(&self, query: &str) -> Result<ModeComparison> {
        let coarse = self.retrieve(query).await?;
        let reranked = self.rerank_hits(query, &coarse).await?;

        let no_evidence_answer = self
            .answer_with_mode(query, EvidenceMode::None, &coarse, &reranked)
            .await?;
        let coarse_answer = self
            .answer_with_mode(query, EvidenceMode::Coarse, &coarse, &reranked)
            .await?;
        let reranked_answer = self
            .answer_with_mode(query, EvidenceMode::Reranked, &coarse, &reranked)
            .await?;

        Ok(ModeComparison {
            query: query.to_string(),
            coarse_hits: coarse,
            reranked,
            no_evidence_answer,
            coarse_answer,
            reranked_answer,
        })
    }

    async fn generate_with(&self, query: &str, evidence: &[String]) -> Result<String> {
        let prompt = build_prompt(&self.config.metaprompt, query, evidence);
        self.generator.generate(&prompt).await
    }

    /// Get pipeline parameters
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the shared similarity index
    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.k_coarse, 50);
        assert_eq!(config.k_fine, 5);
        assert!(config.k_fine <= config.k_coarse);
    }

    #[test]
    fn test_pipeline_rejects_k_fine_above_k_coarse() {
        use crate::models::{Embedder, Generator, RelevanceScorer};
        use async_trait::async_trait;

        struct Never;

        #[async_trait]
        impl Embedder for Never {
            async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
                unreachable!("construction should fail first")
            }
        }
        #[async_trait]
        impl RelevanceScorer for Never {
            async fn score(&self, _q: &str, _c: &[String]) -> Result<Vec<f64>> {
                unreachable!()
            }
        }
        #[async_trait]
        impl Generator for Never {
            async fn generate(&self, _p: &str) -> Result<String> {
                unreachable!()
            }
        }

        let index = Arc::new(
            SimilarityIndex::new(
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec!["a".to_string(), "b".to_string()],
            )
            .unwrap(),
        );

        let bad = RetrievalPipeline::new(
            Arc::clone(&index),
            Arc::new(Never),
            Arc::new(Never),
            Arc::new(Never),
            PipelineConfig {
                k_coarse: 2,
                k_fine: 3,
                metaprompt: String::new(),
            },
        );
        assert!(matches!(bad, Err(RagError::InvalidK { .. })));

        let too_deep = RetrievalPipeline::new(
            index,
            Arc::new(Never),
            Arc::new(Never),
            Arc::new(Never),
            PipelineConfig {
                k_coarse: 5,
                k_fine: 2,
                metaprompt: String::new(),
            },
        );
        assert!(matches!(too_deep, Err(RagError::InvalidK { .. })));
    }
}

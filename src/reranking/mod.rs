//! Cross-encoder reranking of retrieved candidates
//!
//! Re-scores each query's candidate set through an external relevance
//! scorer and keeps the top k. The scorer is invoked exactly once per
//! query, covering all of that query's candidates in a single call.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{RagError, Result};
use crate::models::RelevanceScorer;
use crate::ranking::top_k_indices;

/// A candidate text with its cross-encoder relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub text: String,
    pub score: f64,
}

/// Per-query rerank result. Scoring failures are isolated per query:
/// one failed query does not discard the rest of the batch.
pub type RerankOutcome = Result<Vec<ScoredCandidate>>;

/// Reranker backed by an external pairwise relevance scorer
pub struct Reranker {
    scorer: Arc<dyn RelevanceScorer>,
}

impl Reranker {
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Rerank each query's candidates and keep the k most relevant.
    ///
    /// Batch-level preconditions are checked eagerly: queries and
    /// candidates must pair up (`LengthMismatch`) and `1 <= k <=
    /// candidates[i].len()` for every query (`InvalidK`). After that,
    /// queries are scored concurrently and outcomes returned in input
    /// order; a scorer failure surfaces as `ScoringFailed` for that
    /// query only.
    ///
    /// Within each query, ties break by lowest original candidate index,
    /// the same discipline the similarity index uses.
    pub async fn rerank(
        &self,
        queries: &[String],
        candidates: &[Vec<String>],
        k: usize,
    ) -> Result<Vec<RerankOutcome>> {
        if queries.len() != candidates.len() {
            return Err(RagError::LengthMismatch {
                queries: queries.len(),
                candidates: candidates.len(),
            });
        }

        for set in candidates {
            if k == 0 || k > set.len() {
                return Err(RagError::InvalidK {
                    k,
                    available: set.len(),
                });
            }
        }

        let futures = queries
            .iter()
            .zip(candidates)
            .map(|(query, set)| self.rerank_one(query, set, k));

        Ok(join_all(futures).await)
    }

    /// Score one query's candidates and select its top k
    async fn rerank_one(&self, query: &str, candidates: &[String], k: usize) -> RerankOutcome {
        let scores = self
            .scorer
            .score(query, candidates)
            .await
            .map_err(|e| match e {
                RagError::ScoringFailed(msg) => RagError::ScoringFailed(msg),
                other => RagError::ScoringFailed(other.to_string()),
            })?;

        if scores.len() != candidates.len() {
            return Err(RagError::ScoringFailed(format!(
                "scorer returned {} scores for {} candidates",
                scores.len(),
                candidates.len()
            )));
        }

        let selected = top_k_indices(&scores, k)
            .into_iter()
            .map(|i| ScoredCandidate {
                text: candidates[i].clone(),
                score: scores[i],
            })
            .collect();

        Ok(selected)
    }
}

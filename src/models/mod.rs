//! External model collaborators
//!
//! The pipeline talks to its embedding, scoring, and generation models
//! through capability traits so tests can substitute deterministic stubs.
//! HTTP implementations live in the submodules.

pub mod cross_encoder;
pub mod ollama;

use async_trait::async_trait;

use crate::errors::Result;

pub use cross_encoder::CrossEncoderClient;
pub use ollama::{OllamaEmbedder, OllamaGenerator};

/// Maps a batch of texts to fixed-length embedding vectors.
///
/// Every returned vector must have the same dimensionality as the corpus
/// the queries will be searched against.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Scores the relevance of each candidate to a query.
///
/// One call covers all candidates for a query; the returned scores must
/// align with the candidate order. Callers rely on this batching to bound
/// expensive external calls to one per query.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f64>>;
}

/// Turns a fully-built prompt into answer text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

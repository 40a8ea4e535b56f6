//! Error types for the medrag pipeline
//!
//! Malformed input shapes are detected eagerly, before any numeric
//! computation begins. External collaborator failures (embedding, scoring,
//! generation) carry their own variants so callers can tell a pipeline
//! logic error apart from an unavailable model.

use thiserror::Error;

/// Main error type for retrieval, reranking, and generation
#[derive(Error, Debug)]
pub enum RagError {
    /// Corpus keys/values length mismatch or inconsistent dimensionality
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Requested k outside [1, available candidates]
    #[error("Invalid k: requested {k}, but {available} candidates are available")]
    InvalidK { k: usize, available: usize },

    /// Queries/candidates batch length mismatch in reranking
    #[error("Batch length mismatch: {queries} queries vs {candidates} candidate lists")]
    LengthMismatch { queries: usize, candidates: usize },

    /// External scorer failed for a query's candidate set
    #[error("Scoring failed: {0}")]
    ScoringFailed(String),

    /// External embedder failure
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// External generator failure
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tensor computation errors
    #[error("Tensor error: {0}")]
    TensorError(#[from] candle_core::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

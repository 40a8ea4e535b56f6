//! medrag - grounded question answering over a precomputed evidence corpus
//!
//! Retrieval runs in three stages over an immutable corpus:
//!
//! - **retrieval**: batched cosine top-k over a dense key matrix
//! - **reranking**: cross-encoder refinement of the coarse candidates
//! - **pipeline**: prompt assembly and generation from the surviving evidence
//!
//! Embedding, relevance scoring, and generation are external collaborators
//! behind the traits in [`models`].

pub mod cli;
pub mod corpus;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod repl;
pub mod reranking;
pub mod retrieval;

pub(crate) mod ranking;

// Re-export commonly used types
pub use errors::{RagError, Result};
pub use pipeline::{PipelineConfig, RetrievalPipeline};

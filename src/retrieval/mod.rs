//! Batched top-k cosine similarity search over a precomputed corpus
//!
//! The index owns the corpus key matrix and per-row L2 norms, both computed
//! once at construction. Everything is read-only afterward, so a single
//! index can be shared across concurrent searches without locking.

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::errors::{RagError, Result};
use crate::ranking::top_k_indices;

/// Additive denominator stabilizer so degenerate (all-zero) vectors score 0
/// instead of dividing by zero
const COSINE_EPSILON: f64 = 1e-5;

/// A single retrieved passage with its cosine similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub score: f32,
}

/// Read-only vector similarity index over dense corpus embeddings
///
/// Holds the N×D key matrix (pre-transposed for the batched matrix product)
/// and the precomputed norms. Norms are derived data cached at construction;
/// there is no mutation path, so they are never recomputed.
pub struct SimilarityIndex {
    /// Key matrix stored transposed (D×N) and contiguous for matmul
    keys_t: Tensor,
    /// Precomputed per-row L2 norms, shape (N,)
    norms: Tensor,
    values: Vec<String>,
    dim: usize,
    device: Device,
}

impl SimilarityIndex {
    /// Build an index from a key matrix and its parallel text values.
    ///
    /// Precomputes `norms[i] = ||keys[i]||` for every row. Fails with
    /// `ShapeMismatch` if keys and values differ in length or any row
    /// has a different dimensionality than the first.
    pub fn new(keys: Vec<Vec<f32>>, values: Vec<String>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(RagError::ShapeMismatch {
                context: "corpus keys vs values".to_string(),
                expected: keys.len(),
                actual: values.len(),
            });
        }

        let n = keys.len();
        if n == 0 {
            return Err(RagError::ShapeMismatch {
                context: "corpus entries".to_string(),
                expected: 1,
                actual: 0,
            });
        }

        let dim = keys[0].len();
        if dim == 0 {
            return Err(RagError::ShapeMismatch {
                context: "embedding dimensionality".to_string(),
                expected: 1,
                actual: 0,
            });
        }

        for (row, key) in keys.iter().enumerate() {
            if key.len() != dim {
                return Err(RagError::ShapeMismatch {
                    context: format!("embedding dimensionality at row {}", row),
                    expected: dim,
                    actual: key.len(),
                });
            }
        }

        let device = Device::Cpu;
        let flat: Vec<f32> = keys.into_iter().flatten().collect();
        let key_matrix = Tensor::from_vec(flat, (n, dim), &device)?;

        let norms = key_matrix.sqr()?.sum(1)?.sqrt()?;
        let keys_t = key_matrix.t()?.contiguous()?;

        Ok(Self {
            keys_t,
            norms,
            values,
            dim,
            device,
        })
    }

    /// Batched top-k cosine search.
    ///
    /// Computes all query-corpus dot products as one B×N matrix product,
    /// stabilizes the cosine denominator with a small epsilon, and selects
    /// the k best entries per query. Ties resolve to the lowest corpus
    /// index, so the ranking is deterministic and batch-size independent.
    ///
    /// Fails with `InvalidK` unless `1 <= k <= N`, and `ShapeMismatch` if
    /// any query vector does not match the corpus dimensionality. Both are
    /// checked before any computation starts.
    pub fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<SearchHit>>> {
        if k == 0 || k > self.len() {
            return Err(RagError::InvalidK {
                k,
                available: self.len(),
            });
        }

        for (i, query) in queries.iter().enumerate() {
            if query.len() != self.dim {
                return Err(RagError::ShapeMismatch {
                    context: format!("query dimensionality at position {}", i),
                    expected: self.dim,
                    actual: query.len(),
                });
            }
        }

        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let batch = queries.len();
        let flat: Vec<f32> = queries.iter().flatten().copied().collect();
        let q = Tensor::from_vec(flat, (batch, self.dim), &self.device)?;

        let q_norms = q.sqr()?.sum(1)?.sqrt()?;
        let prods = q.matmul(&self.keys_t)?;
        let denom = q_norms
            .unsqueeze(1)?
            .broadcast_mul(&self.norms.unsqueeze(0)?)?
            .affine(1.0, COSINE_EPSILON)?;
        let sims = prods.broadcast_div(&denom)?.to_vec2::<f32>()?;

        let results = sims
            .iter()
            .map(|row| {
                top_k_indices(row, k)
                    .into_iter()
                    .map(|i| SearchHit {
                        text: self.values[i].clone(),
                        score: row[i],
                    })
                    .collect()
            })
            .collect();

        Ok(results)
    }

    /// Number of corpus entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects empty corpora
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Embedding dimensionality D
    pub fn dim(&self) -> usize {
        self.dim
    }
}

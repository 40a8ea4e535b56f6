//! Corpus loading
//!
//! The corpus is two flat files: a JSON array-of-arrays of embedding rows
//! and a JSON array of the parallel passage texts. Pairing and shape
//! validation happen at index construction, not here.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::Result;
use crate::retrieval::SimilarityIndex;

/// The raw (embedding, text) arrays a similarity index is built from
#[derive(Debug, Clone)]
pub struct Corpus {
    pub keys: Vec<Vec<f32>>,
    pub values: Vec<String>,
}

impl Corpus {
    /// Load the key matrix and passage texts from their flat files
    pub fn load(keys_path: &Path, values_path: &Path) -> Result<Self> {
        let keys_file = File::open(keys_path)?;
        let keys: Vec<Vec<f32>> = serde_json::from_reader(BufReader::new(keys_file))?;

        let values_file = File::open(values_path)?;
        let values: Vec<String> = serde_json::from_reader(BufReader::new(values_file))?;

        Ok(Self { keys, values })
    }

    /// Number of passages
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build the read-only similarity index, consuming the raw arrays
    pub fn into_index(self) -> Result<SimilarityIndex> {
        SimilarityIndex::new(self.keys, self.values)
    }
}

// lexicon.rs — Dense lookup tables supplied by the trained model.
//
// All tables are built once and stay read-only for the lifetime of the
// process; averaging jobs share them behind an Arc without locking.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::vocab::Vocabulary;

/// Row-major matrix of f32 vectors with a fixed row width.
#[derive(Debug, Clone)]
pub struct VectorTable {
    size: usize,
    data: Vec<f32>,
}

impl VectorTable {
    /// Build from explicit rows. Every row must have width `size`.
    pub fn from_rows(size: usize, rows: &[Vec<f32>]) -> anyhow::Result<Self> {
        if size == 0 {
            bail!("vector size must be positive");
        }
        let mut data = Vec::with_capacity(rows.len() * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                bail!("row {i} has width {}, expected {size}", row.len());
            }
            data.extend_from_slice(row);
        }
        Ok(Self { size, data })
    }

    /// Row width (the embedding dimensionality).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.len() / self.size
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.size;
        &self.data[start..start + self.size]
    }

    /// Flat row-major view, used by the dense kernels.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Vocabulary plus its word-vector table and per-word weight table.
///
/// The weight table is carried in full generality (one scalar per row) even
/// though the plain-averaging strategy requires all ones; the gate lives in
/// `Average::new`, not here.
#[derive(Debug, Clone)]
pub struct Lexicon {
    vocab: Vocabulary,
    vectors: VectorTable,
    weights: Vec<f32>,
}

impl Lexicon {
    pub fn new(vocab: Vocabulary, vectors: VectorTable, weights: Vec<f32>) -> anyhow::Result<Self> {
        if vocab.is_empty() {
            bail!("lexicon requires a non-empty vocabulary");
        }
        if vectors.rows() != vocab.len() {
            bail!(
                "vector table has {} rows for a vocabulary of {} tokens",
                vectors.rows(),
                vocab.len()
            );
        }
        if weights.len() != vocab.len() {
            bail!(
                "weight table has {} entries for a vocabulary of {} tokens",
                weights.len(),
                vocab.len()
            );
        }
        Ok(Self { vocab, vectors, weights })
    }

    /// Convenience constructor with unit weights for every word.
    pub fn with_unit_weights(vocab: Vocabulary, vectors: VectorTable) -> anyhow::Result<Self> {
        let weights = vec![1.0; vocab.len()];
        Self::new(vocab, vectors, weights)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn size(&self) -> usize {
        self.vectors.size()
    }

    /// Largest weight in the table. Used as the scale for n-gram-derived
    /// vectors (OOV weight), mirroring the trained model's convention.
    pub fn max_weight(&self) -> f32 {
        self.weights.iter().copied().fold(f32::MIN, f32::max)
    }
}

/// Character n-gram configuration of a subword-capable embedding source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubwordParams {
    pub min_n: usize,
    pub max_n: usize,
    pub bucket: usize,
}

impl SubwordParams {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_n == 0 {
            bail!("min_n must be at least 1");
        }
        if self.min_n > self.max_n {
            bail!("min_n ({}) exceeds max_n ({})", self.min_n, self.max_n);
        }
        if self.bucket == 0 {
            bail!("bucket count must be positive");
        }
        Ok(())
    }
}

impl Default for SubwordParams {
    fn default() -> Self {
        Self {
            min_n: crate::config::subword::DEFAULT_MIN_N,
            max_n: crate::config::subword::DEFAULT_MAX_N,
            bucket: crate::config::subword::DEFAULT_BUCKET,
        }
    }
}

/// Bucket-indexed n-gram vector table for the OOV fallback path.
#[derive(Debug, Clone)]
pub struct SubwordVectors {
    params: SubwordParams,
    vectors: VectorTable,
}

impl SubwordVectors {
    pub fn new(params: SubwordParams, vectors: VectorTable) -> anyhow::Result<Self> {
        params.validate().context("invalid subword parameters")?;
        if vectors.rows() != params.bucket {
            bail!(
                "n-gram table has {} rows, expected one per bucket ({})",
                vectors.rows(),
                params.bucket
            );
        }
        Ok(Self { params, vectors })
    }

    pub fn params(&self) -> &SubwordParams {
        &self.params
    }

    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_table() -> VectorTable {
        VectorTable::from_rows(2, &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_vector_table_rows() {
        let t = toy_table();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.size(), 2);
        assert_eq!(t.row(2), &[1.0, 1.0]);
    }

    #[test]
    fn test_vector_table_rejects_ragged_rows() {
        assert!(VectorTable::from_rows(2, &[vec![1.0], vec![0.0, 1.0]]).is_err());
        assert!(VectorTable::from_rows(0, &[]).is_err());
    }

    #[test]
    fn test_lexicon_shape_checks() {
        let vocab = Vocabulary::from_tokens(["cat", "say", "meow"]).unwrap();
        assert!(Lexicon::with_unit_weights(vocab.clone(), toy_table()).is_ok());

        // Weight table length mismatch.
        assert!(Lexicon::new(vocab.clone(), toy_table(), vec![1.0; 2]).is_err());

        // Vector table row-count mismatch.
        let short = VectorTable::from_rows(2, &[vec![1.0, 0.0]]).unwrap();
        assert!(Lexicon::with_unit_weights(vocab, short).is_err());
    }

    #[test]
    fn test_max_weight() {
        let vocab = Vocabulary::from_tokens(["cat", "say", "meow"]).unwrap();
        let lex = Lexicon::new(vocab, toy_table(), vec![0.5, 2.0, 1.0]).unwrap();
        assert_eq!(lex.max_weight(), 2.0);
    }

    #[test]
    fn test_subword_params_validation() {
        assert!(SubwordParams { min_n: 0, max_n: 3, bucket: 8 }.validate().is_err());
        assert!(SubwordParams { min_n: 4, max_n: 3, bucket: 8 }.validate().is_err());
        assert!(SubwordParams { min_n: 2, max_n: 3, bucket: 0 }.validate().is_err());
        assert!(SubwordParams::default().validate().is_ok());
    }

    #[test]
    fn test_subword_vectors_require_bucket_rows() {
        let params = SubwordParams { min_n: 2, max_n: 3, bucket: 4 };
        let table = VectorTable::from_rows(2, &vec![vec![0.0, 0.0]; 4]).unwrap();
        assert!(SubwordVectors::new(params, table).is_ok());

        let short = VectorTable::from_rows(2, &vec![vec![0.0, 0.0]; 3]).unwrap();
        assert!(SubwordVectors::new(params, short).is_err());
    }
}

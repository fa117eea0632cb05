// output.rs — The shared sentence-vector output matrix.
//
// The matrix is allocated by the orchestration side (one row per sentence
// the corpus will ever reference) and handed to averaging jobs mutably.
// Jobs write whole rows by destination index and never resize the buffer;
// a batch that skips a sentence leaves its row untouched.

use anyhow::bail;

#[derive(Debug, Clone)]
pub struct SentenceVectors {
    size: usize,
    data: Vec<f32>,
}

impl SentenceVectors {
    /// Allocate a zeroed rows × size matrix.
    pub fn zeros(rows: usize, size: usize) -> anyhow::Result<Self> {
        if size == 0 {
            bail!("vector size must be positive");
        }
        Ok(Self {
            size,
            data: vec![0.0; rows * size],
        })
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.size
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Overwrite one row. An out-of-range index means the caller allocated
    /// too few rows for its corpus, so it surfaces as an error instead of
    /// growing the buffer.
    pub fn put(&mut self, index: usize, row: &[f32]) -> anyhow::Result<()> {
        if index >= self.rows() {
            bail!("destination row {index} out of range ({} rows allocated)", self.rows());
        }
        if row.len() != self.size {
            bail!("row width {} does not match matrix width {}", row.len(), self.size);
        }
        let start = index * self.size;
        self.data[start..start + self.size].copy_from_slice(row);
        Ok(())
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.size;
        &self.data[start..start + self.size]
    }

    /// Copy out all rows, e.g. for a host response.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.rows()).map(|i| self.row(i).to_vec()).collect()
    }
}

// inputs.rs — Batch input types.

use serde::{Deserialize, Serialize};

/// An already-tokenized sentence paired with its destination row in the
/// output matrix. Indices within a batch are unique but need not be
/// contiguous or sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSentence {
    pub words: Vec<String>,
    pub index: usize,
}

impl IndexedSentence {
    pub fn new<S: Into<String>>(words: Vec<S>, index: usize) -> Self {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            index,
        }
    }
}

/// Pair sentences with row indices in enumeration order, the common case
/// when one corpus fills the whole output matrix.
pub fn enumerate_sentences<I, S>(sentences: I) -> Vec<IndexedSentence>
where
    I: IntoIterator<Item = Vec<S>>,
    S: Into<String>,
{
    sentences
        .into_iter()
        .enumerate()
        .map(|(index, words)| IndexedSentence::new(words, index))
        .collect()
}

// vocab.rs — Token-to-row-index vocabulary.
//
// The vocabulary is built once, before any averaging job, and is read-only
// afterwards. Lookups are O(1).

use std::collections::HashMap;

use anyhow::bail;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary assigning row indices 0..n in iteration order.
    /// Duplicate tokens are rejected (each token owns exactly one row).
    pub fn from_tokens<I, S>(tokens: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        for (row, token) in tokens.into_iter().enumerate() {
            let token = token.into();
            if index.insert(token.clone(), row).is_some() {
                bail!("duplicate token in vocabulary: {token:?}");
            }
        }
        Ok(Self { index })
    }

    /// Build from explicit (token, row) pairs, e.g. a deserialized map.
    /// Rows must form a permutation of 0..n.
    pub fn from_entries<I, S>(entries: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        for (token, row) in entries {
            let token = token.into();
            if index.insert(token.clone(), row).is_some() {
                bail!("duplicate token in vocabulary: {token:?}");
            }
        }
        let n = index.len();
        let mut seen = vec![false; n];
        for (token, &row) in &index {
            if row >= n {
                bail!("vocabulary row {row} for {token:?} out of range (vocabulary has {n} entries)");
            }
            if seen[row] {
                bail!("vocabulary row {row} assigned twice");
            }
            seen[row] = true;
        }
        Ok(Self { index })
    }

    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

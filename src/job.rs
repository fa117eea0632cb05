// job.rs — The contract between the external training loop and the engine.
//
// The trait is deliberately thin: the loop owns batching policy (see
// config::batch::MAX_WORDS_IN_BATCH) and the output matrix; a job receives
// one batch, writes its rows, and reports what it actually processed.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::inputs::IndexedSentence;
use crate::output::SentenceVectors;

/// Effective counts for one job: sentences that produced an output row and
/// the words that contributed to them. Purely observational; the driving
/// loop sums these for corpus-wide progress and sanity checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub sentences: usize,
    pub words: usize,
}

impl AddAssign for JobStats {
    fn add_assign(&mut self, other: Self) {
        self.sentences += other.sentences;
        self.words += other.words;
    }
}

/// One batch-processing operation over a shared output matrix.
///
/// Callers running jobs concurrently must hand each job a disjoint set of
/// destination rows; the engine itself takes the matrix mutably and does no
/// locking.
pub trait TrainJob {
    fn do_train_job(
        &self,
        batch: &[IndexedSentence],
        output: &mut SentenceVectors,
    ) -> anyhow::Result<JobStats>;
}

/// Split a batch into jobs of at most `max_words` words, preserving order.
/// A single sentence longer than the cap still forms its own job.
pub fn chunk_by_words(batch: &[IndexedSentence], max_words: usize) -> Vec<&[IndexedSentence]> {
    let mut jobs = Vec::new();
    let mut start = 0;
    let mut words = 0;
    for (i, sentence) in batch.iter().enumerate() {
        let len = sentence.words.len();
        if words + len > max_words && i > start {
            jobs.push(&batch[start..i]);
            start = i;
            words = 0;
        }
        words += len;
    }
    if start < batch.len() {
        jobs.push(&batch[start..]);
    }
    jobs
}

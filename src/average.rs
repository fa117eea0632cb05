// average.rs — Averaged sentence vectors over pre-trained word embeddings.
//
// One strategy object serves two operating modes, fixed when the job is
// constructed:
// - plain: only in-vocabulary tokens contribute; the mean divides by the
//   resolved-token count.
// - subword: every token contributes, OOV tokens through their n-gram
//   bucket rows; the mean divides by the full sentence length.
//
// The denominators differ on purpose. Under subword fallback every token
// adds something to the numerator, so the full sentence length is the right
// divisor; under plain averaging unresolved tokens add nothing and must not
// deflate the mean.

use std::sync::Arc;

use anyhow::bail;

use crate::inputs::IndexedSentence;
use crate::job::{JobStats, TrainJob};
use crate::kernel;
use crate::lexicon::{Lexicon, SubwordVectors};
use crate::ngrams;
use crate::output::SentenceVectors;

pub struct Average {
    lexicon: Arc<Lexicon>,
    subword: Option<Arc<SubwordVectors>>,
    // max of the weight table, scales every n-gram-derived vector
    oov_weight: f32,
}

impl Average {
    /// Build the averaging job. Fails if the weight table carries any
    /// non-unit weight (the table stays general for other strategies, but
    /// averaging is defined over unit weights) or if the n-gram table's
    /// width disagrees with the word vectors.
    pub fn new(lexicon: Arc<Lexicon>, subword: Option<Arc<SubwordVectors>>) -> anyhow::Result<Self> {
        if lexicon.weights().iter().any(|&w| w != 1.0) {
            bail!("all word weights must equal one for averaging");
        }
        if let Some(sub) = &subword {
            if sub.vectors().size() != lexicon.size() {
                bail!(
                    "n-gram vectors have width {}, word vectors have width {}",
                    sub.vectors().size(),
                    lexicon.size()
                );
            }
        }
        let oov_weight = lexicon.max_weight();
        Ok(Self { lexicon, subword, oov_weight })
    }

    pub fn has_subword(&self) -> bool {
        self.subword.is_some()
    }

    pub fn size(&self) -> usize {
        self.lexicon.size()
    }

    /// Plain mode: unresolvable tokens are dropped; a sentence where nothing
    /// resolves is skipped outright and leaves its output row untouched.
    fn train_plain(
        &self,
        batch: &[IndexedSentence],
        output: &mut SentenceVectors,
    ) -> anyhow::Result<JobStats> {
        let lex = &self.lexicon;
        let size = lex.size();
        let data = lex.vectors().data();

        let mut stats = JobStats::default();
        let mut indices = Vec::new();
        let mut weights = Vec::new();
        for sentence in batch {
            indices.clear();
            weights.clear();
            for word in &sentence.words {
                if let Some(row) = lex.vocab().get(word) {
                    indices.push(row);
                    weights.push(lex.weights()[row]);
                }
            }
            if indices.is_empty() {
                continue;
            }

            let mut vec = kernel::weighted_sum_rows(data, size, &indices, &weights)?;
            let inv = 1.0 / indices.len() as f32;
            for v in &mut vec {
                *v *= inv;
            }
            output.put(sentence.index, &vec)?;

            stats.sentences += 1;
            stats.words += indices.len();
        }
        Ok(stats)
    }

    /// Subword mode: every token lands in the accumulator, in-vocabulary
    /// tokens via their word vector, OOV tokens via the mean of their n-gram
    /// bucket rows scaled by the OOV weight. A token whose bracketed form is
    /// too short for any n-gram adds zero.
    fn train_subword(
        &self,
        sub: &SubwordVectors,
        batch: &[IndexedSentence],
        output: &mut SentenceVectors,
    ) -> anyhow::Result<JobStats> {
        let lex = &self.lexicon;
        let size = lex.size();
        let w_data = lex.vectors().data();
        let n_data = sub.vectors().data();

        let mut stats = JobStats::default();
        for sentence in batch {
            if sentence.words.is_empty() {
                continue;
            }

            let mut acc = vec![0.0f32; size];
            for word in &sentence.words {
                if let Some(row) = lex.vocab().get(word) {
                    let weight = lex.weights()[row];
                    let row = &w_data[row * size..row * size + size];
                    for (a, &v) in acc.iter_mut().zip(row) {
                        *a += weight * v;
                    }
                } else {
                    let hashes = ngrams::ngram_hashes(word, sub.params());
                    if hashes.is_empty() {
                        continue;
                    }
                    let mean = kernel::mean_rows(n_data, size, &hashes)?;
                    for (a, &v) in acc.iter_mut().zip(&mean) {
                        *a += self.oov_weight * v;
                    }
                }
            }

            // Every token counts here, resolved or not.
            let inv = 1.0 / sentence.words.len() as f32;
            for a in &mut acc {
                *a *= inv;
            }
            output.put(sentence.index, &acc)?;

            stats.sentences += 1;
            stats.words += sentence.words.len();
        }
        Ok(stats)
    }
}

impl TrainJob for Average {
    fn do_train_job(
        &self,
        batch: &[IndexedSentence],
        output: &mut SentenceVectors,
    ) -> anyhow::Result<JobStats> {
        if output.size() != self.lexicon.size() {
            bail!(
                "output matrix width {} does not match vector width {}",
                output.size(),
                self.lexicon.size()
            );
        }

        let stats = match &self.subword {
            Some(sub) => self.train_subword(sub, batch, output)?,
            None => self.train_plain(batch, output)?,
        };
        log::debug!(
            "train job: {} sentences in, {} effective sentences, {} effective words",
            batch.len(),
            stats.sentences,
            stats.words
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{SubwordParams, VectorTable};
    use crate::vocab::Vocabulary;

    fn lexicon() -> Arc<Lexicon> {
        let vocab = Vocabulary::from_tokens(["cat", "say", "meow"]).unwrap();
        let table =
            VectorTable::from_rows(2, &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
        Arc::new(Lexicon::with_unit_weights(vocab, table).unwrap())
    }

    /// Subword table whose bucket rows are all the same vector, so the mean
    /// over any non-empty hash list is that vector regardless of hashing.
    fn uniform_subword(row: [f32; 2], min_n: usize, max_n: usize) -> Arc<SubwordVectors> {
        let bucket = 16;
        let params = SubwordParams { min_n, max_n, bucket };
        let rows = vec![row.to_vec(); bucket];
        let table = VectorTable::from_rows(2, &rows).unwrap();
        Arc::new(SubwordVectors::new(params, table).unwrap())
    }

    fn assert_row_near(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "got {actual:?}, expected {expected:?}");
        }
    }

    #[test]
    fn test_plain_average_is_token_mean() {
        let job = Average::new(lexicon(), None).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        let batch = vec![IndexedSentence::new(vec!["cat", "say", "meow"], 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        assert_eq!(stats, JobStats { sentences: 1, words: 3 });
        assert_row_near(sv.row(0), &[2.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_plain_skips_fully_unresolvable_sentence() {
        let job = Average::new(lexicon(), None).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        sv.put(0, &[9.0, 9.0]).unwrap();
        let batch = vec![IndexedSentence::new(vec!["dog"], 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        assert_eq!(stats, JobStats::default());
        // Row untouched: the sentence never resolved a single token.
        assert_eq!(sv.row(0), &[9.0, 9.0]);
    }

    #[test]
    fn test_plain_divides_by_resolved_count_only() {
        let job = Average::new(lexicon(), None).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        let batch = vec![IndexedSentence::new(vec!["cat", "dog", "meow"], 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        // "dog" is dropped from numerator and denominator alike.
        assert_eq!(stats, JobStats { sentences: 1, words: 2 });
        assert_row_near(sv.row(0), &[1.0, 0.5]);
    }

    #[test]
    fn test_subword_divides_by_full_sentence_length() {
        let job = Average::new(lexicon(), Some(uniform_subword([0.2, 0.4], 2, 3))).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        let batch = vec![IndexedSentence::new(vec!["cat", "dog"], 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        // Both tokens count, resolved or not.
        assert_eq!(stats, JobStats { sentences: 1, words: 2 });
        // ([1,0] + oov_weight * [0.2,0.4]) / 2 with oov_weight = 1.
        assert_row_near(sv.row(0), &[0.6, 0.2]);
    }

    #[test]
    fn test_subword_oov_only_sentence() {
        let job = Average::new(lexicon(), Some(uniform_subword([0.2, 0.4], 2, 3))).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        let batch = vec![IndexedSentence::new(vec!["dog"], 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        assert_eq!(stats, JobStats { sentences: 1, words: 1 });
        assert_row_near(sv.row(0), &[0.2, 0.4]);
    }

    #[test]
    fn test_subword_applies_bucket_rows_of_the_hashes() {
        // Distinct bucket rows; the expected vector is recomputed from the
        // hash list, so this checks the engine's gather-mean wiring.
        let params = SubwordParams { min_n: 2, max_n: 3, bucket: 4 };
        let rows = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.5, 0.5],
            vec![0.0, -1.0],
        ];
        let table = VectorTable::from_rows(2, &rows).unwrap();
        let sub = Arc::new(SubwordVectors::new(params, table).unwrap());

        let hashes = ngrams::ngram_hashes("dog", &params);
        assert!(!hashes.is_empty());
        let mut expected = [0.0f32; 2];
        for &h in &hashes {
            expected[0] += rows[h][0];
            expected[1] += rows[h][1];
        }
        expected[0] /= hashes.len() as f32;
        expected[1] /= hashes.len() as f32;

        let job = Average::new(lexicon(), Some(sub)).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        let batch = vec![IndexedSentence::new(vec!["dog"], 0)];
        job.do_train_job(&batch, &mut sv).unwrap();
        assert_row_near(sv.row(0), &expected);
    }

    #[test]
    fn test_subword_token_without_ngrams_adds_zero_but_counts() {
        // min_n=4 leaves "<a>" (3 chars) with no n-grams at all.
        let job = Average::new(lexicon(), Some(uniform_subword([0.2, 0.4], 4, 6))).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        sv.put(0, &[9.0, 9.0]).unwrap();
        let batch = vec![IndexedSentence::new(vec!["a"], 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        // The sentence is still effective and its row IS written (as zeros).
        assert_eq!(stats, JobStats { sentences: 1, words: 1 });
        assert_eq!(sv.row(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_subword_empty_sentence_skipped() {
        let job = Average::new(lexicon(), Some(uniform_subword([0.2, 0.4], 2, 3))).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        sv.put(0, &[9.0, 9.0]).unwrap();
        let batch = vec![IndexedSentence::new(Vec::<String>::new(), 0)];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        assert_eq!(stats, JobStats::default());
        assert_eq!(sv.row(0), &[9.0, 9.0]);
    }

    #[test]
    fn test_non_unit_weights_rejected_at_construction() {
        let vocab = Vocabulary::from_tokens(["cat", "say", "meow"]).unwrap();
        let table =
            VectorTable::from_rows(2, &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let lex = Arc::new(Lexicon::new(vocab, table, vec![1.0, 2.0, 1.0]).unwrap());

        let err = Average::new(lex, None);
        assert!(err.is_err());
    }

    #[test]
    fn test_rerun_is_bit_identical() {
        let job = Average::new(lexicon(), Some(uniform_subword([0.2, 0.4], 2, 3))).unwrap();
        let batch = vec![
            IndexedSentence::new(vec!["cat", "say", "meow"], 0),
            IndexedSentence::new(vec!["dog", "say"], 1),
        ];

        let mut first = SentenceVectors::zeros(2, 2).unwrap();
        job.do_train_job(&batch, &mut first).unwrap();
        let mut second = SentenceVectors::zeros(2, 2).unwrap();
        job.do_train_job(&batch, &mut second).unwrap();

        assert_eq!(first.to_rows(), second.to_rows());
    }

    #[test]
    fn test_destination_indices_need_not_be_contiguous() {
        let job = Average::new(lexicon(), None).unwrap();
        let mut sv = SentenceVectors::zeros(3, 2).unwrap();
        let batch = vec![
            IndexedSentence::new(vec!["cat"], 2),
            IndexedSentence::new(vec!["meow"], 0),
        ];

        let stats = job.do_train_job(&batch, &mut sv).unwrap();
        assert_eq!(stats, JobStats { sentences: 2, words: 2 });
        assert_row_near(sv.row(2), &[1.0, 0.0]);
        assert_row_near(sv.row(0), &[1.0, 1.0]);
        assert_eq!(sv.row(1), &[0.0, 0.0]);
    }

    #[test]
    fn test_destination_out_of_range_is_an_error() {
        let job = Average::new(lexicon(), None).unwrap();
        let mut sv = SentenceVectors::zeros(1, 2).unwrap();
        let batch = vec![IndexedSentence::new(vec!["cat"], 5)];
        assert!(job.do_train_job(&batch, &mut sv).is_err());
    }

    #[test]
    fn test_output_width_mismatch_is_an_error() {
        let job = Average::new(lexicon(), None).unwrap();
        let mut sv = SentenceVectors::zeros(1, 3).unwrap();
        assert!(job.do_train_job(&[], &mut sv).is_err());
    }
}

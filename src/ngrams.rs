// ngrams.rs — Character n-gram hashing for out-of-vocabulary tokens.
//
// A token is bracketed with word-boundary markers ("dog" → "<dog>") and every
// character window of length min_n..=max_n is hashed into a bucket index.
// The bracketed form makes prefixes/suffixes distinguishable from interior
// substrings, and lets the whole word itself act as one n-gram when it fits.
//
// Hashing is FNV-1a over the window's UTF-8 bytes, reduced modulo the bucket
// count. Duplicate windows keep their duplicate hashes; callers that average
// bucket rows count them in the denominator.

use crate::lexicon::SubwordParams;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Bucket indices for every character n-gram of the bracketed token.
///
/// Returns an empty list when the bracketed token is shorter than `min_n`
/// characters; the caller treats that as a zero contribution, not an error.
pub fn ngram_hashes(token: &str, params: &SubwordParams) -> Vec<usize> {
    let padded = format!("<{token}>");

    // Byte offsets of every char boundary, so windows slice on whole chars.
    let mut bounds: Vec<usize> = padded.char_indices().map(|(i, _)| i).collect();
    bounds.push(padded.len());
    let n_chars = bounds.len() - 1;

    let mut hashes = Vec::new();
    for n in params.min_n..=params.max_n {
        if n > n_chars {
            break;
        }
        for start in 0..=(n_chars - n) {
            let gram = &padded[bounds[start]..bounds[start + n]];
            hashes.push(bucket_of(gram.as_bytes(), params.bucket));
        }
    }
    hashes
}

fn bucket_of(bytes: &[u8], bucket: usize) -> usize {
    (u64::from(fnv1a(bytes)) % bucket as u64) as usize
}

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut h = FNV_OFFSET_BASIS;
    for &b in bytes {
        h ^= u32::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

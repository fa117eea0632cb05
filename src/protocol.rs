// protocol.rs — Typed request shapes for the host.
//
// Requests arrive as framed JSON objects; params are decoded per method
// with serde_json::from_value, so a malformed payload turns into a
// per-request error response instead of killing the host.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::inputs::IndexedSentence;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Params for `loadModel`: the trained tables the engine averages over.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadModelParams {
    /// Vector width.
    pub size: usize,
    /// Token → row index into `vectors`.
    pub vocab: HashMap<String, usize>,
    /// One row per vocabulary entry.
    pub vectors: Vec<Vec<f32>>,
    /// One scalar per row; defaults to unit weights when omitted.
    #[serde(default)]
    pub weights: Option<Vec<f32>>,
    /// Present iff the embedding source supports sub-word decomposition.
    #[serde(default)]
    pub subword: Option<SubwordBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubwordBlock {
    pub min_n: usize,
    pub max_n: usize,
    pub bucket: usize,
    /// One row per hash bucket.
    pub vectors: Vec<Vec<f32>>,
}

/// Params for `prepare`: allocate the output matrix.
#[derive(Debug, Deserialize)]
pub struct PrepareParams {
    pub rows: usize,
}

/// Params for `trainBatch`.
#[derive(Debug, Deserialize)]
pub struct TrainParams {
    pub sentences: Vec<IndexedSentence>,
}

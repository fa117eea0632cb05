// kernel/candle.rs — Tensor-backed kernels on the candle CPU device.
//
// Only the selected rows are copied into a tensor; the full table stays in
// its flat buffer.

use anyhow::Context;
use candle_core::{Device, Tensor};

fn gather(data: &[f32], size: usize, indices: &[usize], device: &Device) -> anyhow::Result<Tensor> {
    let mut rows = Vec::with_capacity(indices.len() * size);
    for &row in indices {
        rows.extend_from_slice(&data[row * size..row * size + size]);
    }
    Tensor::from_slice(&rows, (indices.len(), size), device).context("build row tensor")
}

/// Sum of `weights[k] * row(indices[k])` over all k.
pub fn weighted_sum_rows(
    data: &[f32],
    size: usize,
    indices: &[usize],
    weights: &[f32],
) -> anyhow::Result<Vec<f32>> {
    debug_assert!(!indices.is_empty());
    debug_assert_eq!(indices.len(), weights.len());

    let device = Device::Cpu;
    let rows = gather(data, size, indices, &device)?;
    let weights = Tensor::from_slice(weights, (weights.len(), 1), &device)?;
    let summed = rows.broadcast_mul(&weights)?.sum(0)?;
    summed.to_vec1::<f32>().context("extract kernel result")
}

/// Arithmetic mean of the rows at `indices`; duplicates count every time
/// they appear.
pub fn mean_rows(data: &[f32], size: usize, indices: &[usize]) -> anyhow::Result<Vec<f32>> {
    debug_assert!(!indices.is_empty());

    let device = Device::Cpu;
    let rows = gather(data, size, indices, &device)?;
    let mean = rows.mean(0)?;
    mean.to_vec1::<f32>().context("extract kernel result")
}

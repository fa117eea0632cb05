// kernel/scalar.rs — Portable fallback kernels, plain loops over f32 slices.

/// Sum of `weights[k] * row(indices[k])` over all k.
pub fn weighted_sum_rows(
    data: &[f32],
    size: usize,
    indices: &[usize],
    weights: &[f32],
) -> anyhow::Result<Vec<f32>> {
    debug_assert!(!indices.is_empty());
    debug_assert_eq!(indices.len(), weights.len());

    let mut acc = vec![0.0f32; size];
    for (&row, &weight) in indices.iter().zip(weights) {
        let row = &data[row * size..row * size + size];
        for (a, &v) in acc.iter_mut().zip(row) {
            *a += weight * v;
        }
    }
    Ok(acc)
}

/// Arithmetic mean of the rows at `indices`; duplicates count every time
/// they appear.
pub fn mean_rows(data: &[f32], size: usize, indices: &[usize]) -> anyhow::Result<Vec<f32>> {
    debug_assert!(!indices.is_empty());

    let mut acc = vec![0.0f32; size];
    for &row in indices {
        let row = &data[row * size..row * size + size];
        for (a, &v) in acc.iter_mut().zip(row) {
            *a += v;
        }
    }
    let inv = 1.0 / indices.len() as f32;
    for a in &mut acc {
        *a *= inv;
    }
    Ok(acc)
}

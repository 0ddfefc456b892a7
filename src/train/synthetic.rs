//! Synthetic classification data for searches without a data pipeline

use super::Batch;
use crate::autograd::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Separable "blobs": one random center per class, uniform jitter around it
///
/// Returns `samples` examples split into batches of at most `batch_size`
/// rows. Inputs are `[rows, features]`; targets are one-hot `[rows, classes]`.
/// Class labels cycle `0, 1, ..., classes - 1` so every batch is balanced
/// when `batch_size` is a multiple of `classes`.
///
/// # Panics
///
/// Panics if `features`, `classes` or `batch_size` is zero.
pub fn blobs(samples: usize, features: usize, classes: usize, batch_size: usize, seed: u64) -> Vec<Batch> {
    assert!(features > 0 && classes > 0 && batch_size > 0, "blobs: zero-sized dimension");
    let mut rng = StdRng::seed_from_u64(seed);

    let centers: Vec<Vec<f32>> = (0..classes)
        .map(|_| (0..features).map(|_| rng.random_range(-4.0..4.0)).collect())
        .collect();

    let labels: Vec<usize> = (0..samples).map(|i| i % classes).collect();
    labels
        .chunks(batch_size)
        .map(|chunk| {
            let mut inputs = Vec::with_capacity(chunk.len() * features);
            let mut targets = vec![0.0; chunk.len() * classes];
            for (row, &label) in chunk.iter().enumerate() {
                inputs.extend(centers[label].iter().map(|c| c + rng.random_range(-1.0..1.0)));
                targets[row * classes + label] = 1.0;
            }
            Batch::new(
                Tensor::from_shape_vec(&[chunk.len(), features], inputs, false),
                Tensor::from_shape_vec(&[chunk.len(), classes], targets, false),
            )
        })
        .collect()
}

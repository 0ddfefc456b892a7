//! Classification accuracy

use super::Metric;
use crate::autograd::Tensor;

/// Index of the largest value (first one on ties)
pub(crate) fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| if v > max { (i, v) } else { (best, max) })
        .0
}

/// Accuracy metric for classification
///
/// For `[batch, classes]` rows with more than one class: fraction of rows
/// where argmax(pred) == argmax(target). For a single column: predictions
/// are thresholded and compared against targets thresholded at 0.5.
///
/// # Example
///
/// ```
/// use gumbel_nas::autograd::Tensor;
/// use gumbel_nas::train::{Accuracy, Metric};
///
/// let pred = Tensor::from_shape_vec(&[2, 2], vec![0.9, 0.1, 0.3, 0.7], false);
/// let target = Tensor::from_shape_vec(&[2, 2], vec![1.0, 0.0, 1.0, 0.0], false);
///
/// assert_eq!(Accuracy::default().compute(&pred, &target), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Accuracy {
    threshold: f32,
}

impl Accuracy {
    /// Create new accuracy metric with given threshold for single-column outputs
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Accuracy {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        if predictions.is_empty() {
            return 0.0;
        }

        let cols = if predictions.shape().len() > 1 { predictions.row_len().max(1) } else { 1 };
        let pred = predictions.to_vec();
        let target = targets.to_vec();

        let (correct, total) = if cols == 1 {
            let correct = pred
                .iter()
                .zip(&target)
                .filter(|&(&p, &t)| (p >= self.threshold) == (t >= 0.5))
                .count();
            (correct, pred.len())
        } else {
            let correct = pred
                .chunks(cols)
                .zip(target.chunks(cols))
                .filter(|(p, t)| argmax(p) == argmax(t))
                .count();
            (correct, pred.len() / cols)
        };

        correct as f32 / total as f32
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

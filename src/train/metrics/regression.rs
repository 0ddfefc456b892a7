//! Regression metrics

use super::Metric;
use crate::autograd::Tensor;

/// Mean Absolute Error
///
/// MAE = mean(|y - y_pred|)
#[derive(Debug, Clone, Copy, Default)]
pub struct MAE;

impl Metric for MAE {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        assert_eq!(predictions.len(), targets.len());

        if predictions.is_empty() {
            return 0.0;
        }

        let total: f32 = predictions
            .data()
            .iter()
            .zip(targets.data().iter())
            .map(|(p, t)| (p - t).abs())
            .sum();
        total / predictions.len() as f32
    }

    fn name(&self) -> &'static str {
        "mae"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mae() {
        let pred = Tensor::from_vec(vec![1.0, 2.0, 4.0], false);
        let target = Tensor::from_vec(vec![1.0, 3.0, 2.0], false);
        assert!((MAE.compute(&pred, &target) - 1.0).abs() < 1e-6);
        assert!(!MAE.higher_is_better());
    }
}

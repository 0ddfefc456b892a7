//! Mean Squared Error loss

use super::LossFn;
use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)^2)
///
/// # Example
///
/// ```
/// use gumbel_nas::autograd::Tensor;
/// use gumbel_nas::train::{LossFn, MSELoss};
///
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
/// let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);
///
/// let loss = MSELoss.forward(&pred, &target);
/// assert!((loss.item() - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let diff: Array1<f32> = &*predictions.data() - &*targets.data();
        let n = diff.len().max(1) as f32;
        let mse = diff.mapv(|d| d * d).sum() / n;

        let requires_grad = predictions.requires_grad();
        let mut loss = Tensor::from_vec(vec![mse], requires_grad);

        if requires_grad {
            // d(MSE)/d(pred) = 2 (pred - target) / n
            loss.set_backward_op(Rc::new(MSEBackward {
                predictions: predictions.clone(),
                grad: diff * (2.0 / n),
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}

struct MSEBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for MSEBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.predictions.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse_value_and_gradient() {
        let pred = Tensor::from_shape_vec(&[2, 1], vec![1.0, 3.0], true);
        let target = Tensor::from_shape_vec(&[2, 1], vec![0.0, 1.0], false);

        let loss = MSELoss.forward(&pred, &target);
        assert_abs_diff_eq!(loss.item(), 2.5);

        let grads = grad(&loss, &[pred.clone()]);
        assert_eq!(grads[0].as_ref().unwrap().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_mse_perfect_prediction() {
        let pred = Tensor::from_vec(vec![1.0, 2.0], true);
        let loss = MSELoss.forward(&pred, &pred.detach());
        assert_eq!(loss.item(), 0.0);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mse_length_mismatch() {
        let _ = MSELoss.forward(&Tensor::zeros(2, false), &Tensor::zeros(3, false));
    }
}

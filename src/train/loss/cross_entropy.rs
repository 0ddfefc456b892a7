//! Cross Entropy Loss for classification

use super::LossFn;
use crate::autograd::{softmax_slice, BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Cross Entropy Loss over rows of logits
///
/// L = mean_b(-Σ_c targets[b, c] · log softmax(predictions[b])_c)
///
/// Targets are one-hot (or any distribution) rows of the same shape as the
/// predictions. A 1-D input is treated as a single row.
///
/// # Example
///
/// ```
/// use gumbel_nas::autograd::Tensor;
/// use gumbel_nas::train::{CrossEntropyLoss, LossFn};
///
/// let logits = Tensor::from_shape_vec(&[1, 3], vec![2.0, 1.0, 0.5], true);
/// let targets = Tensor::from_shape_vec(&[1, 3], vec![1.0, 0.0, 0.0], false);
///
/// let loss = CrossEntropyLoss.forward(&logits, &targets);
/// assert!(loss.item() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        let cols = if predictions.shape().len() > 1 { predictions.row_len() } else { predictions.len() };
        let cols = cols.max(1);
        let rows = (predictions.len() / cols).max(1);

        let (ce, grad) = {
            let logits = predictions.data();
            let labels = targets.data();
            let mut ce = 0.0f32;
            let mut grad = Vec::with_capacity(predictions.len());
            let logits = logits.as_slice().unwrap_or(&[]);
            let labels = labels.as_slice().unwrap_or(&[]);
            for (l, t) in logits.chunks(cols).zip(labels.chunks(cols)) {
                let probs = softmax_slice(l);
                ce -= t.iter().zip(&probs).map(|(&t, &p)| t * p.max(f32::MIN_POSITIVE).ln()).sum::<f32>();
                // d(CE)/d(logits) = (softmax - targets) / rows
                grad.extend(probs.iter().zip(t).map(|(p, t)| (p - t) / rows as f32));
            }
            (ce / rows as f32, Array1::from(grad))
        };

        let requires_grad = predictions.requires_grad();
        let mut loss = Tensor::from_vec(vec![ce], requires_grad);

        if requires_grad {
            loss.set_backward_op(Rc::new(CrossEntropyBackward {
                predictions: predictions.clone(),
                grad,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

struct CrossEntropyBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.predictions.clone()]
    }
}

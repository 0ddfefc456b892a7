//! Loss function trait

use crate::autograd::Tensor;

/// Trait for loss functions
pub trait LossFn {
    /// Compute a scalar loss from `[batch, ...]` predictions and targets
    ///
    /// The returned tensor carries a backward op into `predictions`.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}

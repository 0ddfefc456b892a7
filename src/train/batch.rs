//! Batch data structure

use crate::autograd::Tensor;

/// A training batch containing inputs and targets
///
/// Both tensors are `[batch, ...]`; row `i` of `targets` belongs to row `i`
/// of `inputs`.
#[derive(Clone, Debug)]
pub struct Batch {
    /// Input features
    pub inputs: Tensor,
    /// Target labels/values
    pub targets: Tensor,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of examples (leading dimension of the inputs)
    pub fn size(&self) -> usize {
        self.inputs.rows()
    }
}

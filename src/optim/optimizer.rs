//! Optimizer trait

use crate::autograd::Tensor;
use ndarray::Array1;

/// Trait for optimization algorithms
///
/// Optimizer state (momentum, moments) is positional: entry `i` belongs to
/// `params[i]`. A given optimizer instance must therefore always be driven
/// with the same parameter list in the same order.
pub trait Optimizer {
    /// Apply one update from an explicit gradient list
    ///
    /// `grads[i]` pairs with `params[i]`; a `None` gradient leaves that
    /// parameter (and its state) untouched. Each call counts as exactly one
    /// optimizer step.
    ///
    /// # Panics
    ///
    /// Panics if `grads` and `params` differ in length.
    fn apply_gradients(&mut self, grads: &[Option<Array1<f32>>], params: &[Tensor]);

    /// Perform a single optimization step from the gradients stored on `params`
    fn step(&mut self, params: &[Tensor]) {
        let grads: Vec<_> = params.iter().map(Tensor::grad).collect();
        self.apply_gradients(&grads, params);
    }

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &[Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Number of updates applied so far
    fn step_count(&self) -> u64;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Check the gradient list against the parameter list
pub(crate) fn check_lengths(name: &str, grads: &[Option<Array1<f32>>], params: &[Tensor]) {
    assert_eq!(
        grads.len(),
        params.len(),
        "{name}: {} gradients for {} parameters",
        grads.len(),
        params.len()
    );
}

/// Size positional state on first use
pub(crate) fn ensure_state(state: &mut Vec<Option<Array1<f32>>>, len: usize) {
    if state.len() != len {
        state.resize(len, None);
    }
}

//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over a graph of
//! [`Tensor`] nodes. Every differentiable op attaches a [`BackwardOp`] to its
//! result; [`backward`] walks the graph once in reverse topological order.
//!
//! ## Gradients for a parameter list
//!
//! [`grad`] is the single differentiation call used by the supernet training
//! step: it returns one gradient per requested tensor, in request order, from
//! one backward pass.
//!
//! ```
//! use gumbel_nas::autograd::{grad, mul, sum, Tensor};
//!
//! let w = Tensor::from_vec(vec![1.0, 2.0], true);
//! let x = Tensor::from_vec(vec![3.0, 4.0], false);
//! let loss = sum(&mul(&w, &x));
//!
//! let grads = grad(&loss, &[w.clone()]);
//! assert_eq!(grads[0].as_ref().unwrap().to_vec(), vec![3.0, 4.0]);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{topological_order, BackwardOp};
pub use context::Context;
pub use ops::*;
pub(crate) use ops::softmax_slice;
pub use tensor::{GradCell, Tensor};

use ndarray::Array1;

/// Perform a backward pass from `tensor`
///
/// Seeds the output gradient with `grad_output`, or with ones for a scalar
/// loss, then runs every reachable backward op exactly once.
pub fn backward(tensor: &Tensor, grad_output: Option<Array1<f32>>) {
    let seed = grad_output.unwrap_or_else(|| Array1::ones(tensor.len()));
    tensor.accumulate_grad(seed);

    for node in topological_order(tensor).iter().rev() {
        if node.grad().is_none() {
            continue;
        }
        if let Some(op) = node.backward_op() {
            op.backward();
        }
    }
}

/// Gradients of a scalar `loss` with respect to `wrt`, from one backward pass
///
/// Existing gradients on `wrt` are cleared first. The result has one entry per
/// requested tensor, in the same order; an entry is `None` when the tensor
/// does not influence the loss.
pub fn grad(loss: &Tensor, wrt: &[Tensor]) -> Vec<Option<Array1<f32>>> {
    for t in wrt {
        t.zero_grad();
    }
    backward(loss, None);
    wrt.iter().map(Tensor::grad).collect()
}

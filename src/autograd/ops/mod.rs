//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod matmul;
mod relaxed;

// Re-export all public operations
pub use activations::{relu, softmax_rows, tanh};
pub use basic::{add, add_all, mean, mul, scale, sum};
pub use matmul::{add_bias, matmul};
pub use relaxed::{gumbel_noise, mix, relaxed_one_hot, shared_gumbel_noise};

pub(crate) use activations::softmax_slice;

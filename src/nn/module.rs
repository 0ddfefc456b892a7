//! Module trait and forward-pass result

use super::{ParamRegistry, Parameter};
use crate::autograd::{add_all, Context, Tensor};
use crate::error::Result;

/// Result of a forward pass
///
/// Auxiliary losses (mixture cost penalties, regularizers) are returned next
/// to the output rather than written into shared state; the caller decides
/// how to fold them into the objective.
#[derive(Clone, Debug)]
pub struct Forward {
    /// Primary output tensor
    pub output: Tensor,
    /// Scalar loss terms produced while computing `output`, in graph order
    pub aux_losses: Vec<Tensor>,
}

impl Forward {
    /// Forward result with no auxiliary losses
    pub fn new(output: Tensor) -> Self {
        Self { output, aux_losses: Vec::new() }
    }

    /// Forward result carrying auxiliary losses
    pub fn with_aux(output: Tensor, aux_losses: Vec<Tensor>) -> Self {
        Self { output, aux_losses }
    }

    /// Sum of all auxiliary losses (a zero scalar when there are none)
    pub fn aux_total(&self) -> Tensor {
        add_all(&self.aux_losses)
    }
}

/// A node of the network graph
///
/// Shapes are full batch shapes, `[batch, features...]`.
pub trait Module {
    /// Allocate parameters for `input_shape` and return the output shape
    ///
    /// Calling `build` again with the same input shape is a no-op that returns
    /// the same output shape; a different shape is an error.
    fn build(&mut self, input_shape: &[usize], registry: &mut ParamRegistry) -> Result<Vec<usize>>;

    /// Compute the output for `input`
    fn forward(&self, input: &Tensor, ctx: &mut Context) -> Result<Forward>;

    /// Trainable parameters reachable from this module, in discovery order
    fn parameters(&self) -> Vec<Parameter>;

    /// Static floating-point operation count for one forward pass
    fn flops(&self, input_shape: &[usize]) -> u64;

    /// Module name
    fn name(&self) -> &str;
}

//! Static cost estimation for candidate operations

use crate::nn::Module;

/// Static cost of running `op` on an input of `input_shape`
///
/// Called once per candidate when a mixture layer is built, with a
/// single-example shape. The result must depend on the shape only and be
/// finite; a mixture refuses to build with a NaN or infinite cost.
pub trait CostEstimator {
    fn estimate(&self, op: &dyn Module, input_shape: &[usize]) -> f32;
}

/// Cost = the module's floating-point operation count
#[derive(Clone, Copy, Debug, Default)]
pub struct FlopCounter;

impl CostEstimator for FlopCounter {
    fn estimate(&self, op: &dyn Module, input_shape: &[usize]) -> f32 {
        op.flops(input_shape) as f32
    }
}

impl<F> CostEstimator for F
where
    F: Fn(&dyn Module, &[usize]) -> f32,
{
    fn estimate(&self, op: &dyn Module, input_shape: &[usize]) -> f32 {
        self(op, input_shape)
    }
}

/// Replace the batch dimension with 1
pub fn single_example_shape(input_shape: &[usize]) -> Vec<usize> {
    let mut shape = input_shape.to_vec();
    if let Some(batch) = shape.first_mut() {
        *batch = 1;
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::{Dense, Identity};

    #[test]
    fn test_single_example_shape() {
        assert_eq!(single_example_shape(&[32, 8]), vec![1, 8]);
        assert_eq!(single_example_shape(&[4, 3, 3]), vec![1, 3, 3]);
        assert!(single_example_shape(&[]).is_empty());
    }

    #[test]
    fn test_flop_counter_uses_module_flops() {
        let dense = Dense::new(8);
        assert_eq!(FlopCounter.estimate(&dense, &[1, 4]), 72.0);
        assert_eq!(FlopCounter.estimate(&Identity::new(), &[1, 4]), 0.0);
    }

    #[test]
    fn test_closure_estimator() {
        let by_width = |_: &dyn Module, shape: &[usize]| shape.iter().product::<usize>() as f32;
        assert_eq!(by_width.estimate(&Identity::new(), &[1, 5]), 5.0);
    }
}

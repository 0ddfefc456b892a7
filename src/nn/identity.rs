//! Parameter-free candidate operations

use super::{Forward, Module, ParamRegistry, Parameter};
use crate::autograd::{Context, Tensor};
use crate::error::Result;

/// Skip connection: returns its input unchanged
#[derive(Clone, Debug)]
pub struct Identity {
    name: String,
}

impl Identity {
    pub fn new() -> Self {
        Self { name: "identity".into() }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Identity {
    fn build(&mut self, input_shape: &[usize], _registry: &mut ParamRegistry) -> Result<Vec<usize>> {
        Ok(input_shape.to_vec())
    }

    fn forward(&self, input: &Tensor, _ctx: &mut Context) -> Result<Forward> {
        Ok(Forward::new(input.clone()))
    }

    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn flops(&self, _input_shape: &[usize]) -> u64 {
        0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The "none" operation: zeros shaped like its input, no gradient path
#[derive(Clone, Debug)]
pub struct Zero {
    name: String,
}

impl Zero {
    pub fn new() -> Self {
        Self { name: "zero".into() }
    }
}

impl Default for Zero {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Zero {
    fn build(&mut self, input_shape: &[usize], _registry: &mut ParamRegistry) -> Result<Vec<usize>> {
        Ok(input_shape.to_vec())
    }

    fn forward(&self, input: &Tensor, _ctx: &mut Context) -> Result<Forward> {
        Ok(Forward::new(Tensor::zeros_shape(input.shape(), false)))
    }

    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn flops(&self, _input_shape: &[usize]) -> u64 {
        0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passes_input_through() {
        let x = Tensor::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0], true);
        let out = Identity::new().forward(&x, &mut Context::new()).unwrap();
        assert_eq!(out.output.id(), x.id());
        assert_eq!(Identity::new().flops(&[2, 2]), 0);
    }

    #[test]
    fn test_zero_output() {
        let mut registry = ParamRegistry::new(0);
        let mut zero = Zero::new();
        assert_eq!(zero.build(&[3, 4], &mut registry).unwrap(), vec![3, 4]);

        let x = Tensor::full(&[3, 4], 2.0, true);
        let out = zero.forward(&x, &mut Context::new()).unwrap();
        assert_eq!(out.output.shape(), &[3, 4]);
        assert!(out.output.data().iter().all(|&v| v == 0.0));
        assert!(!out.output.requires_grad());
        assert!(zero.parameters().is_empty());
    }
}

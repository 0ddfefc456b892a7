//! Ordered composition of modules

use super::{Forward, Module, ParamRegistry, Parameter};
use crate::autograd::{Context, Tensor};
use crate::error::{NasError, Result};

/// Modules applied one after another
///
/// Auxiliary losses of the children are concatenated in layer order.
pub struct Sequential {
    name: String,
    layers: Vec<Box<dyn Module>>,
    /// Per-layer input shapes without the batch dimension, set by `build`
    input_shapes: Vec<Vec<usize>>,
}

impl Sequential {
    pub fn new(layers: Vec<Box<dyn Module>>) -> Self {
        Self { name: "sequential".into(), layers, input_shapes: Vec::new() }
    }

    /// Append a layer; only valid before `build`
    pub fn push(&mut self, layer: Box<dyn Module>) {
        self.layers.push(layer);
        self.input_shapes.clear();
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Box<dyn Module>] {
        &self.layers
    }
}

impl Module for Sequential {
    fn build(&mut self, input_shape: &[usize], registry: &mut ParamRegistry) -> Result<Vec<usize>> {
        if input_shape.is_empty() {
            return Err(NasError::ShapeMismatch {
                layer: self.name.clone(),
                expected: vec![0],
                actual: Vec::new(),
            });
        }
        let mut shape = input_shape.to_vec();
        let mut input_shapes = Vec::with_capacity(self.layers.len());
        for layer in &mut self.layers {
            input_shapes.push(shape[1..].to_vec());
            shape = layer.build(&shape, registry)?;
        }
        self.input_shapes = input_shapes;
        Ok(shape)
    }

    fn forward(&self, input: &Tensor, ctx: &mut Context) -> Result<Forward> {
        if self.input_shapes.len() != self.layers.len() {
            return Err(NasError::NotBuilt(self.name.clone()));
        }
        let mut output = input.clone();
        let mut aux_losses = Vec::new();
        for layer in &self.layers {
            let step = layer.forward(&output, ctx)?;
            output = step.output;
            aux_losses.extend(step.aux_losses);
        }
        Ok(Forward::with_aux(output, aux_losses))
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.layers.iter().flat_map(|layer| layer.parameters()).collect()
    }

    fn flops(&self, input_shape: &[usize]) -> u64 {
        let batch = input_shape.first().copied().unwrap_or(1);
        self.layers
            .iter()
            .zip(&self.input_shapes)
            .map(|(layer, rest)| {
                let mut shape = Vec::with_capacity(rest.len() + 1);
                shape.push(batch);
                shape.extend_from_slice(rest);
                layer.flops(&shape)
            })
            .sum()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

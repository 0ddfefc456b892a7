//! Fully connected layer

use super::{Forward, Module, ParamRegistry, Parameter};
use crate::autograd::{add_bias, matmul, relu, tanh, Context, Tensor};
use crate::error::{NasError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Activation applied after the affine transform
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    None,
    Relu,
    Tanh,
}

impl Activation {
    fn apply(self, x: &Tensor) -> Tensor {
        match self {
            Activation::None => x.clone(),
            Activation::Relu => relu(x),
            Activation::Tanh => tanh(x),
        }
    }
}

struct DenseWeights {
    in_features: usize,
    kernel: Parameter,
    bias: Parameter,
}

/// Dense layer: `activation(x W + b)` on `[batch, in]` inputs
///
/// Weights use Xavier-uniform initialization drawn from the registry
/// generator, so two models built from the same seed start identical.
pub struct Dense {
    name: String,
    units: usize,
    activation: Activation,
    weights: Option<DenseWeights>,
}

impl Dense {
    /// Create a dense layer with `units` outputs and no activation
    pub fn new(units: usize) -> Self {
        Self { name: format!("dense_{units}"), units, activation: Activation::None, weights: None }
    }

    /// Set the activation
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set the layer name (used as the parameter name prefix)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of output units
    pub fn units(&self) -> usize {
        self.units
    }

    /// Configured activation
    pub fn activation(&self) -> Activation {
        self.activation
    }

    fn in_features(&self, input_shape: &[usize]) -> Result<usize> {
        match input_shape {
            [_, features] => Ok(*features),
            other => Err(NasError::ShapeMismatch {
                layer: self.name.clone(),
                expected: vec![0, 0],
                actual: other.to_vec(),
            }),
        }
    }
}

impl Module for Dense {
    fn build(&mut self, input_shape: &[usize], registry: &mut ParamRegistry) -> Result<Vec<usize>> {
        let in_features = self.in_features(input_shape)?;
        let output_shape = vec![input_shape[0], self.units];

        if let Some(weights) = &self.weights {
            if weights.in_features != in_features {
                return Err(NasError::ShapeMismatch {
                    layer: self.name.clone(),
                    expected: vec![input_shape[0], weights.in_features],
                    actual: input_shape.to_vec(),
                });
            }
            return Ok(output_shape);
        }

        let limit = (6.0 / (in_features + self.units) as f32).sqrt();
        let rng = registry.rng();
        let init: Vec<f32> =
            (0..in_features * self.units).map(|_| rng.random_range(-limit..limit)).collect();

        let kernel = registry.create(
            format!("{}/kernel", self.name),
            Tensor::from_shape_vec(&[in_features, self.units], init, true),
            true,
        );
        let bias = registry.create(format!("{}/bias", self.name), Tensor::zeros(self.units, true), true);

        self.weights = Some(DenseWeights { in_features, kernel, bias });
        Ok(output_shape)
    }

    fn forward(&self, input: &Tensor, _ctx: &mut Context) -> Result<Forward> {
        let weights = self.weights.as_ref().ok_or_else(|| NasError::NotBuilt(self.name.clone()))?;
        if input.shape().len() != 2 || input.row_len() != weights.in_features {
            return Err(NasError::ShapeMismatch {
                layer: self.name.clone(),
                expected: vec![input.rows(), weights.in_features],
                actual: input.shape().to_vec(),
            });
        }

        let affine = add_bias(&matmul(input, &weights.kernel.tensor), &weights.bias.tensor);
        Ok(Forward::new(self.activation.apply(&affine)))
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.weights
            .as_ref()
            .map(|w| vec![w.kernel.clone(), w.bias.clone()])
            .unwrap_or_default()
    }

    fn flops(&self, input_shape: &[usize]) -> u64 {
        let batch = input_shape.first().copied().unwrap_or(1) as u64;
        let in_features = input_shape.get(1).copied().unwrap_or(0) as u64;
        let units = self.units as u64;
        2 * batch * in_features * units + batch * units
    }

    fn name(&self) -> &str {
        &self.name
    }
}

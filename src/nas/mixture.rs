//! Mixture-of-operations layer
//!
//! Every forward pass draws a relaxed one-hot sample over the candidate
//! operations, runs every candidate on the full input and returns the
//! per-example weighted sum. The layer also emits a cost loss:
//!
//! ```text
//! cost_loss = mean_b(Σ_k cost_k · w_bk · multiplier)
//! ```
//!
//! The loss is produced even when the multiplier is zero, so every mixture
//! contributes the same kind of term to the objective.

use super::cost::{single_example_shape, CostEstimator, FlopCounter};
use crate::autograd::{
    gumbel_noise, matmul, mean, mix, relaxed_one_hot, scale, shared_gumbel_noise, Context, Tensor,
};
use crate::error::{NasError, Result};
use crate::nn::{Forward, MixtureHandle, Module, ParamRegistry, Parameter, Temperature};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How architecture samples are shared within a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMode {
    /// One independent architecture draw per example
    #[default]
    PerExample,
    /// One architecture draw broadcast to every example of the batch
    Shared,
}

/// State allocated by `build`
struct MixtureState {
    name: String,
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
    preference: Parameter,
    costs: Parameter,
    temperature: Temperature,
}

/// Weighted mixture of named candidate operations
pub struct MixtureLayer {
    name: Option<String>,
    ops: Vec<(String, Box<dyn Module>)>,
    cost_multiplier: f32,
    sample_mode: SampleMode,
    estimator: Box<dyn CostEstimator>,
    state: Option<MixtureState>,
}

impl MixtureLayer {
    /// Create a mixture from `(name, operation)` pairs
    ///
    /// Fails with fewer than two operations or a repeated name.
    pub fn new(ops: Vec<(String, Box<dyn Module>)>, cost_multiplier: f32) -> Result<Self> {
        Self::build_checked(None, ops, cost_multiplier)
    }

    /// Create a mixture with an explicit layer name
    pub fn named(
        name: impl Into<String>,
        ops: Vec<(String, Box<dyn Module>)>,
        cost_multiplier: f32,
    ) -> Result<Self> {
        Self::build_checked(Some(name.into()), ops, cost_multiplier)
    }

    /// Create a mixture from an ordered list, naming operations "0", "1", ...
    pub fn from_ops(ops: Vec<Box<dyn Module>>, cost_multiplier: f32) -> Result<Self> {
        let named = ops.into_iter().enumerate().map(|(i, op)| (i.to_string(), op)).collect();
        Self::new(named, cost_multiplier)
    }

    fn build_checked(
        name: Option<String>,
        ops: Vec<(String, Box<dyn Module>)>,
        cost_multiplier: f32,
    ) -> Result<Self> {
        let layer = name.clone().unwrap_or_else(|| "mixture".to_string());
        if ops.len() < 2 {
            return Err(NasError::TooFewOperations { layer, count: ops.len() });
        }
        let mut seen = HashSet::new();
        for (op_name, _) in &ops {
            if !seen.insert(op_name.as_str()) {
                return Err(NasError::DuplicateOperation { layer, name: op_name.clone() });
            }
        }

        Ok(Self {
            name,
            ops,
            cost_multiplier,
            sample_mode: SampleMode::default(),
            estimator: Box::new(FlopCounter),
            state: None,
        })
    }

    /// Set how samples are shared within a batch
    pub fn with_sample_mode(mut self, mode: SampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    /// Use a different cost estimator (default: [`FlopCounter`])
    pub fn with_cost_estimator<E: CostEstimator + 'static>(mut self, estimator: E) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    /// Candidate operation names in preference-vector order
    pub fn op_names(&self) -> Vec<&str> {
        self.ops.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn cost_multiplier(&self) -> f32 {
        self.cost_multiplier
    }

    pub fn sample_mode(&self) -> SampleMode {
        self.sample_mode
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    /// Learnable preference vector, once built
    pub fn preference(&self) -> Option<&Parameter> {
        self.state.as_ref().map(|s| &s.preference)
    }

    /// Temperature handle, once built
    pub fn temperature(&self) -> Option<Temperature> {
        self.state.as_ref().map(|s| s.temperature.clone())
    }

    /// Static per-operation costs, once built
    pub fn costs(&self) -> Option<Vec<f32>> {
        self.state.as_ref().map(|s| s.costs.tensor.to_vec())
    }

    fn state(&self) -> Result<&MixtureState> {
        self.state.as_ref().ok_or_else(|| NasError::NotBuilt(self.name().to_string()))
    }

    /// Relaxed one-hot weights `[batch, k]` for one forward pass
    ///
    /// Training draws fresh Gumbel noise from the context generator and
    /// reads the current temperature and preference values. Evaluation is
    /// noise-free: every row is `softmax(preference / temperature)`.
    pub fn sample_weights(&self, batch: usize, ctx: &mut Context) -> Result<Tensor> {
        let state = self.state()?;
        let k = self.ops.len();
        let noise = if ctx.is_training() {
            match self.sample_mode {
                SampleMode::PerExample => gumbel_noise(ctx.rng(), batch, k),
                SampleMode::Shared => shared_gumbel_noise(ctx.rng(), batch, k),
            }
        } else {
            Array2::zeros((batch, k))
        };
        Ok(relaxed_one_hot(&state.preference.tensor, &noise, state.temperature.get()))
    }

    /// Cost loss for sampled `weights` (`[batch, k]`)
    pub fn cost_loss(&self, weights: &Tensor) -> Result<Tensor> {
        let state = self.state()?;
        let per_example = matmul(weights, &state.costs.tensor);
        Ok(mean(&scale(&per_example, self.cost_multiplier)))
    }
}

impl Module for MixtureLayer {
    fn build(&mut self, input_shape: &[usize], registry: &mut ParamRegistry) -> Result<Vec<usize>> {
        if let Some(state) = &self.state {
            if state.input_shape.get(1..) != input_shape.get(1..) {
                return Err(NasError::ShapeMismatch {
                    layer: state.name.clone(),
                    expected: state.input_shape.clone(),
                    actual: input_shape.to_vec(),
                });
            }
            return Ok(state.output_shape.clone());
        }
        if input_shape.is_empty() {
            return Err(NasError::ShapeMismatch {
                layer: self.name().to_string(),
                expected: vec![0],
                actual: Vec::new(),
            });
        }

        let mut output_shape: Option<Vec<usize>> = None;
        for (op_name, op) in &mut self.ops {
            let shape = op.build(input_shape, registry)?;
            match &output_shape {
                Some(expected) if *expected != shape => {
                    return Err(NasError::ShapeMismatch {
                        layer: format!("{}/{op_name}", self.name.as_deref().unwrap_or("mixture")),
                        expected: expected.clone(),
                        actual: shape,
                    });
                }
                Some(_) => {}
                None => output_shape = Some(shape),
            }
        }
        let output_shape = output_shape.unwrap_or_else(|| input_shape.to_vec());

        // Named after the candidates are built so nested mixtures number first
        let name = self.name.clone().unwrap_or_else(|| registry.next_mixture_name());

        let single = single_example_shape(input_shape);
        let mut costs = Vec::with_capacity(self.ops.len());
        for (op_name, op) in &self.ops {
            let cost = self.estimator.estimate(op.as_ref(), &single);
            if !cost.is_finite() {
                return Err(NasError::InvalidCost { layer: name, op: op_name.clone(), cost });
            }
            log::debug!("{name}: op '{op_name}' cost {cost}");
            costs.push(cost);
        }

        let k = self.ops.len();
        let costs = registry.create(
            format!("{name}/op_costs"),
            Tensor::from_shape_vec(&[k, 1], costs, false),
            false,
        );
        let preference =
            registry.create(format!("{name}/preference"), Tensor::full(&[k], 1.0, true), true);
        let temperature = Temperature::new(1.0);

        registry.register_mixture(MixtureHandle {
            layer: name.clone(),
            op_names: self.ops.iter().map(|(op_name, _)| op_name.clone()).collect(),
            preference: preference.clone(),
            costs: costs.clone(),
            temperature: temperature.clone(),
        });

        self.name = Some(name.clone());
        self.state = Some(MixtureState {
            name,
            input_shape: input_shape.to_vec(),
            output_shape: output_shape.clone(),
            preference,
            costs,
            temperature,
        });
        Ok(output_shape)
    }

    fn forward(&self, input: &Tensor, ctx: &mut Context) -> Result<Forward> {
        let state = self.state()?;
        if input.shape().get(1..) != state.input_shape.get(1..) {
            return Err(NasError::ShapeMismatch {
                layer: state.name.clone(),
                expected: state.input_shape.clone(),
                actual: input.shape().to_vec(),
            });
        }

        let weights = self.sample_weights(input.rows(), ctx)?;

        let mut outputs = Vec::with_capacity(self.ops.len());
        let mut aux_losses = Vec::new();
        for (_, op) in &self.ops {
            let step = op.forward(input, ctx)?;
            outputs.push(step.output);
            aux_losses.extend(step.aux_losses);
        }

        let output = mix(&outputs, &weights);
        aux_losses.push(self.cost_loss(&weights)?);

        Ok(Forward::with_aux(output, aux_losses))
    }

    fn parameters(&self) -> Vec<Parameter> {
        let mut params: Vec<Parameter> = self.preference().cloned().into_iter().collect();
        params.extend(self.ops.iter().flat_map(|(_, op)| op.parameters()));
        params
    }

    fn flops(&self, input_shape: &[usize]) -> u64 {
        self.ops.iter().map(|(_, op)| op.flops(input_shape)).sum()
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("mixture")
    }
}

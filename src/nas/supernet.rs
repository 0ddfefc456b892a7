//! Supernet wrapper: parameter partition and the joint training step

use super::genotype::Genotype;
use crate::autograd::{add, grad, Context, Tensor};
use crate::error::{NasError, Result};
use crate::nn::{Forward, Module, ParamId, ParamRegistry, Parameter};
use crate::optim::Optimizer;
use crate::train::{Batch, CallbackAction, CallbackContext, CallbackManager, LossFn, Metric, MetricsTracker};
use ndarray::Array1;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

/// Trainable parameters split into architecture and weight groups
///
/// Architecture parameters are the mixture preference vectors, in the order
/// the mixtures were built. Non-architecture parameters are every other
/// trainable value reachable from the network, in traversal order.
#[derive(Clone, Debug)]
pub struct ParamPartition {
    pub non_arch: Vec<Parameter>,
    pub arch: Vec<Parameter>,
}

impl ParamPartition {
    /// Partition the trainable parameters of `network` by id
    ///
    /// Fails when the two groups do not cover the trainable set exactly once:
    /// a parameter reachable twice, or a registered mixture that the network
    /// does not reach.
    pub fn from_network(network: &dyn Module, registry: &ParamRegistry) -> Result<Self> {
        let trainable: Vec<Parameter> = network.parameters().into_iter().filter(|p| p.trainable).collect();
        let total = trainable.iter().map(|p| p.id).collect::<HashSet<_>>().len();

        let arch: Vec<Parameter> = registry.mixtures().iter().map(|m| m.preference.clone()).collect();
        let arch_ids: HashSet<ParamId> = arch.iter().map(|p| p.id).collect();
        let non_arch: Vec<Parameter> =
            trainable.into_iter().filter(|p| !arch_ids.contains(&p.id)).collect();

        if arch.len() + non_arch.len() != total {
            return Err(NasError::PartitionMismatch {
                arch: arch.len(),
                non_arch: non_arch.len(),
                total,
            });
        }
        Ok(Self { non_arch, arch })
    }

    /// Index where architecture gradients start in [`Self::concat`]
    pub fn boundary(&self) -> usize {
        self.non_arch.len()
    }

    /// Total number of partitioned parameters
    pub fn len(&self) -> usize {
        self.non_arch.len() + self.arch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `[non_arch..., arch...]`, the order gradients are requested in
    pub fn concat(&self) -> Vec<Parameter> {
        self.non_arch.iter().chain(&self.arch).cloned().collect()
    }

    fn tensors(params: &[Parameter]) -> Vec<Tensor> {
        params.iter().map(|p| p.tensor.clone()).collect()
    }
}

/// Losses and running metric means after a step
#[derive(Clone, Debug, Default, Serialize)]
pub struct StepMetrics {
    /// Task loss plus auxiliary losses for this batch
    pub loss: f32,
    /// Task loss alone
    pub task_loss: f32,
    /// Sum of auxiliary losses
    pub aux_loss: f32,
    /// Running means since the last reset, including `loss`
    pub running: BTreeMap<String, f32>,
}

/// Outcome of [`SupernetModel::fit`]
#[derive(Clone, Debug, Serialize)]
pub struct SearchResult {
    pub final_epoch: usize,
    pub final_loss: f32,
    pub best_loss: f32,
    pub stopped_early: bool,
    pub elapsed_secs: f64,
    pub metrics: BTreeMap<String, f32>,
    pub genotype: Genotype,
}

struct Compiled {
    partition: ParamPartition,
    concat: Vec<Parameter>,
    optimizer: Box<dyn Optimizer>,
    arch_optimizer: Box<dyn Optimizer>,
    loss_fn: Box<dyn LossFn>,
    metrics: Vec<Box<dyn Metric>>,
    tracker: MetricsTracker,
}

/// A built network containing mixture layers, trained with two optimizers
pub struct SupernetModel {
    network: Box<dyn Module>,
    registry: ParamRegistry,
    output_shape: Vec<usize>,
    ctx: Context,
    verify_ordering: bool,
    compiled: Option<Compiled>,
}

impl SupernetModel {
    /// Build `network` for `input_shape`
    ///
    /// `seed` drives both weight initialization and Gumbel sampling.
    pub fn new(mut network: Box<dyn Module>, input_shape: &[usize], seed: u64) -> Result<Self> {
        let mut registry = ParamRegistry::new(seed);
        let output_shape = network.build(input_shape, &mut registry)?;
        log::debug!(
            "Built '{}' for {input_shape:?} -> {output_shape:?} with {} mixture(s)",
            network.name(),
            registry.mixtures().len()
        );
        Ok(Self {
            network,
            registry,
            output_shape,
            ctx: Context::with_seed(seed),
            verify_ordering: false,
            compiled: None,
        })
    }

    /// Check gradient/parameter correspondence on every step
    pub fn with_verify_ordering(mut self, verify: bool) -> Self {
        self.verify_ordering = verify;
        self
    }

    /// Partition the parameters and attach the optimizers, loss and metrics
    pub fn setup(
        &mut self,
        optimizer: Box<dyn Optimizer>,
        arch_optimizer: Box<dyn Optimizer>,
        loss_fn: Box<dyn LossFn>,
        metrics: Vec<Box<dyn Metric>>,
    ) -> Result<()> {
        let partition = ParamPartition::from_network(self.network.as_ref(), &self.registry)?;
        let concat = partition.concat();

        log::info!("Arch Parameters: {}", partition.arch.len());
        log::info!("Non-arch Parameters: {}", partition.non_arch.len());
        log::info!("All Parameters: {}", concat.len());

        self.compiled = Some(Compiled {
            partition,
            concat,
            optimizer,
            arch_optimizer,
            loss_fn,
            metrics,
            tracker: MetricsTracker::new(),
        });
        Ok(())
    }

    pub fn network(&self) -> &dyn Module {
        self.network.as_ref()
    }

    pub fn registry(&self) -> &ParamRegistry {
        &self.registry
    }

    pub fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    pub fn partition(&self) -> Option<&ParamPartition> {
        self.compiled.as_ref().map(|c| &c.partition)
    }

    pub fn optimizer(&self) -> Option<&dyn Optimizer> {
        self.compiled.as_ref().map(|c| c.optimizer.as_ref())
    }

    pub fn arch_optimizer(&self) -> Option<&dyn Optimizer> {
        self.compiled.as_ref().map(|c| c.arch_optimizer.as_ref())
    }

    /// Current genotype of every mixture
    pub fn genotype(&self) -> Genotype {
        Genotype::from_registry(&self.registry)
    }

    /// Forward pass in training (sampling) or evaluation (noise-free) mode
    pub fn forward(&mut self, input: &Tensor, training: bool) -> Result<Forward> {
        if training {
            self.ctx.train();
        } else {
            self.ctx.eval();
        }
        let result = self.network.forward(input, &mut self.ctx);
        self.ctx.train();
        result
    }

    /// Forget running metric means
    pub fn reset_metrics(&mut self) {
        if let Some(compiled) = &mut self.compiled {
            compiled.tracker.reset();
        }
    }

    /// One joint update of both parameter groups from a single backward pass
    ///
    /// Every check runs before either optimizer touches its parameters, so a
    /// failed step leaves the model unchanged apart from the consumed noise.
    pub fn train_step(&mut self, batch: &Batch) -> Result<StepMetrics> {
        if self.compiled.is_none() {
            return Err(NasError::NotSetUp);
        }
        let forward = self.forward(&batch.inputs, true)?;
        let verify = self.verify_ordering;
        let compiled = self.compiled.as_mut().ok_or(NasError::NotSetUp)?;

        let task_loss = compiled.loss_fn.forward(&forward.output, &batch.targets);
        let aux_loss = forward.aux_total();
        let loss = add(&task_loss, &aux_loss);

        let tensors = ParamPartition::tensors(&compiled.concat);
        let grads = grad(&loss, &tensors);
        check_gradients(&grads, &compiled.concat)?;
        if verify {
            check_ordering(&compiled.concat, compiled.partition.boundary(), &self.registry)?;
        }

        let boundary = compiled.partition.boundary();
        let (non_arch_grads, arch_grads) = grads.split_at(boundary);
        let (non_arch_params, arch_params) = tensors.split_at(boundary);
        compiled.optimizer.apply_gradients(non_arch_grads, non_arch_params);
        compiled.arch_optimizer.apply_gradients(arch_grads, arch_params);

        let metrics = step_metrics(compiled, &forward.output, batch, &task_loss, &aux_loss, &loss);
        log::debug!(
            "step: loss {:.5} (task {:.5}, aux {:.5})",
            metrics.loss,
            metrics.task_loss,
            metrics.aux_loss
        );
        Ok(metrics)
    }

    /// Loss and metrics with noise-free mixture weights, no update
    ///
    /// Uses a fresh tracker so training running means are not disturbed.
    pub fn evaluate(&mut self, batch: &Batch) -> Result<StepMetrics> {
        if self.compiled.is_none() {
            return Err(NasError::NotSetUp);
        }
        let forward = self.forward(&batch.inputs, false)?;
        let compiled = self.compiled.as_ref().ok_or(NasError::NotSetUp)?;

        let task_loss = compiled.loss_fn.forward(&forward.output.detach(), &batch.targets);
        let aux_loss = forward.aux_total();
        let total = task_loss.item() + aux_loss.item();

        let running = compiled
            .metrics
            .iter()
            .map(|m| (m.name().to_string(), m.compute(&forward.output, &batch.targets)))
            .chain(std::iter::once(("loss".to_string(), total)))
            .collect();
        Ok(StepMetrics { loss: total, task_loss: task_loss.item(), aux_loss: aux_loss.item(), running })
    }

    /// Run `epochs` passes over `batches`, firing `callbacks` at the hooks
    ///
    /// Running metrics are reset at every epoch start; the epoch loss is the
    /// mean step loss of that epoch. A skipped epoch runs no steps but still
    /// fires `on_epoch_end`.
    pub fn fit(
        &mut self,
        batches: &[Batch],
        epochs: usize,
        callbacks: &mut CallbackManager,
    ) -> Result<SearchResult> {
        let compiled = self.compiled.as_ref().ok_or(NasError::NotSetUp)?;
        let start = Instant::now();
        let mut ctx = CallbackContext {
            max_epochs: epochs,
            steps_per_epoch: batches.len(),
            lr: compiled.optimizer.lr(),
            arch_lr: compiled.arch_optimizer.lr(),
            ..Default::default()
        };

        let mut final_epoch = 0;
        let mut final_loss = f32::NAN;
        let mut best_loss = f32::INFINITY;
        let mut last_metrics = BTreeMap::new();
        let mut stopped_early = callbacks.on_train_begin(&ctx) == CallbackAction::Stop;

        for epoch in 0..epochs {
            if stopped_early {
                break;
            }
            ctx.epoch = epoch;
            self.reset_metrics();

            match callbacks.on_epoch_begin(&ctx) {
                CallbackAction::Stop => {
                    stopped_early = true;
                    break;
                }
                CallbackAction::SkipEpoch => {
                    log::info!("Epoch {epoch}: skipped");
                    if callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                        stopped_early = true;
                    }
                    continue;
                }
                CallbackAction::Continue => {}
            }

            let mut running = BTreeMap::new();
            for (step, batch) in batches.iter().enumerate() {
                let metrics = self.train_step(batch)?;
                ctx.step = step;
                ctx.global_step += 1;
                ctx.loss = metrics.loss;
                running = metrics.running;
                if callbacks.on_step_end(&ctx) == CallbackAction::Stop {
                    stopped_early = true;
                    break;
                }
            }

            let epoch_loss = running.get("loss").copied().unwrap_or(f32::NAN);
            if epoch_loss < best_loss {
                best_loss = epoch_loss;
            }
            ctx.loss = epoch_loss;
            ctx.best_loss = Some(best_loss).filter(|b| b.is_finite());
            ctx.elapsed_secs = start.elapsed().as_secs_f64();
            log::info!("Epoch {epoch}: loss {epoch_loss:.5} {running:?}");

            final_epoch = epoch;
            final_loss = epoch_loss;
            last_metrics = running;

            if callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                stopped_early = true;
            }
        }

        ctx.elapsed_secs = start.elapsed().as_secs_f64();
        callbacks.on_train_end(&ctx);

        Ok(SearchResult {
            final_epoch,
            final_loss,
            best_loss,
            stopped_early,
            elapsed_secs: ctx.elapsed_secs,
            metrics: last_metrics,
            genotype: self.genotype(),
        })
    }
}

/// One gradient slot per parameter, each shaped like its parameter
fn check_gradients(grads: &[Option<Array1<f32>>], concat: &[Parameter]) -> Result<()> {
    if grads.len() != concat.len() {
        return Err(NasError::OrderingInvariant {
            index: grads.len().min(concat.len()),
            message: format!("{} gradients for {} parameters", grads.len(), concat.len()),
        });
    }
    for (index, (g, p)) in grads.iter().zip(concat).enumerate() {
        if let Some(g) = g {
            if g.len() != p.tensor.len() {
                return Err(NasError::OrderingInvariant {
                    index,
                    message: format!(
                        "gradient of length {} paired with '{}' of length {}",
                        g.len(),
                        p.name,
                        p.tensor.len()
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Check `concat` against the registry that issued its parameters
///
/// Slots from `boundary` on must be the registered mixture preferences in
/// build order. Slots before it must be registered trainable weights, never
/// a preference. Every slot must hold the registry's own tensor.
pub(super) fn check_ordering(concat: &[Parameter], boundary: usize, registry: &ParamRegistry) -> Result<()> {
    let mixtures = registry.mixtures();
    if concat.len() < boundary || concat.len() - boundary != mixtures.len() {
        return Err(NasError::OrderingInvariant {
            index: boundary.min(concat.len()),
            message: format!(
                "{} slots after boundary {boundary}, registry has {} mixture(s)",
                concat.len().saturating_sub(boundary),
                mixtures.len()
            ),
        });
    }
    let arch_ids: HashSet<ParamId> = mixtures.iter().map(|m| m.preference.id).collect();

    for (index, param) in concat.iter().enumerate() {
        let registered = registry.get(param.id).ok_or_else(|| NasError::OrderingInvariant {
            index,
            message: format!("'{}' ({}) was not issued by this registry", param.name, param.id),
        })?;
        if registered.tensor.id() != param.tensor.id() || !registered.trainable {
            return Err(NasError::OrderingInvariant {
                index,
                message: format!("'{}' ({}) does not match its registered parameter", param.name, param.id),
            });
        }

        let misplaced = if index < boundary {
            arch_ids.contains(&param.id).then(|| "architecture parameter in the weight group".to_string())
        } else {
            let handle = &mixtures[index - boundary];
            (handle.preference.id != param.id)
                .then(|| format!("expected preference of '{}' ({})", handle.layer, handle.preference.id))
        };
        if let Some(message) = misplaced {
            return Err(NasError::OrderingInvariant {
                index,
                message: format!("found '{}' ({}): {message}", param.name, param.id),
            });
        }
    }
    Ok(())
}

fn step_metrics(
    compiled: &mut Compiled,
    output: &Tensor,
    batch: &Batch,
    task_loss: &Tensor,
    aux_loss: &Tensor,
    loss: &Tensor,
) -> StepMetrics {
    compiled.tracker.update("loss", loss.item());
    for metric in &compiled.metrics {
        compiled.tracker.update(metric.name(), metric.compute(output, &batch.targets));
    }
    StepMetrics {
        loss: loss.item(),
        task_loss: task_loss.item(),
        aux_loss: aux_loss.item(),
        running: compiled.tracker.means(),
    }
}

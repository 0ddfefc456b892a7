//! Build search components from configuration

use super::schema::{CandidateKind, ModelSpec, OptimSpec, SearchSpec};
use super::validate::ValidationError;
use crate::error::Result;
use crate::nas::{GenotypeWatcher, MixtureLayer, SupernetModel, TemperatureScheduler};
use crate::nn::{Activation, Dense, Identity, Module, Sequential, Zero};
use crate::optim::{Adam, Optimizer, SGD};
use crate::train::{synthetic, Accuracy, Batch, CallbackManager, CrossEntropyLoss};

// Optimizer parameter field names
const PARAM_MOMENTUM: &str = "momentum";
const PARAM_BETA1: &str = "beta1";
const PARAM_BETA2: &str = "beta2";
const PARAM_EPS: &str = "eps";
const PARAM_WEIGHT_DECAY: &str = "weight_decay";

/// Build optimizer from configuration
pub fn build_optimizer(spec: &OptimSpec) -> Result<Box<dyn Optimizer>> {
    match spec.name.to_lowercase().as_str() {
        "sgd" => {
            let momentum = spec.param(PARAM_MOMENTUM).unwrap_or(0.0);
            Ok(Box::new(SGD::new(spec.lr, momentum)))
        }
        "adam" => {
            let beta1 = spec.param(PARAM_BETA1).unwrap_or(0.9);
            let beta2 = spec.param(PARAM_BETA2).unwrap_or(0.999);
            let eps = spec.param(PARAM_EPS).unwrap_or(1e-8);
            let weight_decay = spec.param(PARAM_WEIGHT_DECAY).unwrap_or(0.0);
            Ok(Box::new(Adam::new(spec.lr, beta1, beta2, eps).with_weight_decay(weight_decay)))
        }
        _ => Err(ValidationError::InvalidOptimizer(spec.name.clone()).into()),
    }
}

/// Fresh, unbuilt candidate operations for one mixture layer
pub fn build_candidates(model: &ModelSpec) -> Vec<(String, Box<dyn Module>)> {
    model
        .candidates
        .iter()
        .map(|candidate| {
            let op: Box<dyn Module> = match candidate.kind {
                CandidateKind::Dense => Box::new(
                    Dense::new(model.hidden)
                        .with_activation(candidate.activation)
                        .with_name(candidate.name.clone()),
                ),
                CandidateKind::Identity => Box::new(Identity::new()),
                CandidateKind::Zero => Box::new(Zero::new()),
            };
            (candidate.name.clone(), op)
        })
        .collect()
}

/// `stem -> mixture_0 -> ... -> mixture_{n-1} -> head`, unbuilt
pub fn build_network(spec: &SearchSpec) -> Result<Sequential> {
    let mut network = Sequential::new(vec![Box::new(
        Dense::new(spec.model.hidden).with_activation(Activation::Relu).with_name("stem"),
    )])
    .with_name("supernet");

    for _ in 0..spec.model.mixtures {
        let mixture = MixtureLayer::new(build_candidates(&spec.model), spec.mixture.cost_multiplier)?
            .with_sample_mode(spec.mixture.sample_mode);
        network.push(Box::new(mixture));
    }

    network.push(Box::new(Dense::new(spec.data.classes).with_name("head")));
    Ok(network)
}

/// Build the supernet and attach both optimizers, the loss and metrics
pub fn build_model(spec: &SearchSpec) -> Result<SupernetModel> {
    let network = build_network(spec)?;
    let input_shape = [spec.data.batch_size, spec.data.features];

    let mut model = SupernetModel::new(Box::new(network), &input_shape, spec.seed)?
        .with_verify_ordering(spec.verify_ordering);
    model.setup(
        build_optimizer(&spec.optimizer)?,
        build_optimizer(&spec.arch_optimizer)?,
        Box::new(CrossEntropyLoss),
        vec![Box::new(Accuracy::default())],
    )?;
    Ok(model)
}

/// Temperature scheduler and genotype watcher for `model`
pub fn build_callbacks(spec: &SearchSpec, model: &SupernetModel) -> Result<CallbackManager> {
    let mut callbacks = CallbackManager::new();
    callbacks.add(TemperatureScheduler::new(model.registry(), spec.temperature)?);
    callbacks.add(GenotypeWatcher::new(model.registry()));
    Ok(callbacks)
}

/// Synthetic training batches for the search
pub fn build_data(spec: &SearchSpec) -> Vec<Batch> {
    let data = &spec.data;
    synthetic::blobs(data.samples, data.features, data.classes, data.batch_size, spec.seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate::tests::create_valid_spec;
    use crate::error::NasError;

    #[test]
    fn test_build_optimizer_adam() {
        let spec = OptimSpec::new("adam", 0.001).with_param("beta1", 0.8);
        let optimizer = build_optimizer(&spec).expect("adam is supported");
        assert_eq!(optimizer.lr(), 0.001);
        assert_eq!(optimizer.name(), "adam");
    }

    #[test]
    fn test_build_optimizer_sgd() {
        let spec = OptimSpec::new("SGD", 0.01).with_param("momentum", 0.9);
        let optimizer = build_optimizer(&spec).expect("sgd is supported");
        assert_eq!(optimizer.lr(), 0.01);
        assert_eq!(optimizer.name(), "sgd");
    }

    #[test]
    fn test_build_optimizer_unknown() {
        let err = build_optimizer(&OptimSpec::new("lamb", 0.001)).err().expect("unsupported");
        assert!(matches!(err, NasError::Config(ValidationError::InvalidOptimizer(_))));
    }

    #[test]
    fn test_build_candidates_keeps_order() {
        let spec = create_valid_spec();
        let names: Vec<String> = build_candidates(&spec.model).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["dense_relu", "skip", "none"]);
    }

    #[test]
    fn test_build_model_layout() {
        let spec = create_valid_spec();
        let model = build_model(&spec).unwrap();

        assert_eq!(model.output_shape(), &[12, 3]);
        let handles = model.registry().mixtures();
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].layer, "mixture_0");
        assert_eq!(handles[1].layer, "mixture_1");
        assert_eq!(handles[0].op_names, vec!["dense_relu", "skip", "none"]);

        let partition = model.partition().expect("set up");
        assert_eq!(partition.arch.len(), 2);
        // stem, head and one dense candidate per mixture, kernel + bias each
        assert_eq!(partition.non_arch.len(), 8);
        assert_eq!(model.arch_optimizer().map(|o| o.name()), Some("adam"));
    }

    #[test]
    fn test_build_callbacks() {
        let spec = create_valid_spec();
        let model = build_model(&spec).unwrap();
        let callbacks = build_callbacks(&spec, &model).unwrap();
        assert_eq!(callbacks.names(), vec!["TemperatureScheduler", "GenotypeWatcher"]);
    }

    #[test]
    fn test_build_data_batches() {
        let spec = create_valid_spec();
        let batches = build_data(&spec);
        assert_eq!(batches.len(), 5);
        assert!(batches.iter().all(|b| b.size() == 12));
    }
}

//! Unit tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use crate::nas::{SampleMode, TemperatureSchedule};
use crate::nn::Activation;

pub(crate) fn create_valid_spec() -> SearchSpec {
    SearchSpec {
        seed: 0,
        epochs: 5,
        data: DataSpec { samples: 60, features: 4, classes: 3, batch_size: 12 },
        model: ModelSpec {
            hidden: 6,
            mixtures: 2,
            candidates: vec![
                CandidateSpec { name: "dense_relu".into(), kind: CandidateKind::Dense, activation: Activation::Relu },
                CandidateSpec { name: "skip".into(), kind: CandidateKind::Identity, activation: Activation::None },
                CandidateSpec { name: "none".into(), kind: CandidateKind::Zero, activation: Activation::None },
            ],
        },
        mixture: MixtureSpec { cost_multiplier: 0.0, sample_mode: SampleMode::PerExample },
        optimizer: OptimSpec::new("sgd", 0.1).with_param("momentum", 0.9),
        arch_optimizer: OptimSpec::new("adam", 0.01),
        temperature: TemperatureSchedule { start_epoch: 0, final_epoch: 4, start_temp: 2.0, end_temp: 0.5 },
        verify_ordering: false,
    }
}

#[test]
fn test_valid_config() {
    assert!(validate_config(&create_valid_spec()).is_ok());
}

#[test]
fn test_invalid_epochs() {
    let mut spec = create_valid_spec();
    spec.epochs = 0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidEpochs(0))));
}

#[test]
fn test_invalid_data_sizes() {
    let mut spec = create_valid_spec();
    spec.data.batch_size = 0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidBatchSize(0))));

    let mut spec = create_valid_spec();
    spec.data.classes = 1;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidClasses(1))));

    let mut spec = create_valid_spec();
    spec.data.features = 0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidFeatures(0))));

    let mut spec = create_valid_spec();
    spec.data.samples = 0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidSamples(0))));
}

#[test]
fn test_too_few_candidates() {
    let mut spec = create_valid_spec();
    spec.model.candidates.truncate(1);
    assert!(matches!(validate_config(&spec), Err(ValidationError::TooFewCandidates(1))));

    // No mixtures: the candidate list is unused
    spec.model.mixtures = 0;
    assert!(validate_config(&spec).is_ok());
}

#[test]
fn test_duplicate_candidate() {
    let mut spec = create_valid_spec();
    spec.model.candidates[2].name = "skip".into();
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateCandidate(ref name) if name == "skip"));
}

#[test]
fn test_invalid_cost_multiplier() {
    let mut spec = create_valid_spec();
    spec.mixture.cost_multiplier = -0.1;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidCostMultiplier(_))));

    spec.mixture.cost_multiplier = f32::NAN;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidCostMultiplier(_))));
}

#[test]
fn test_invalid_optimizer() {
    let mut spec = create_valid_spec();
    spec.arch_optimizer.name = "rmsprop".into();
    let err = validate_config(&spec).unwrap_err();
    assert!(err.to_string().contains("rmsprop"));

    let mut spec = create_valid_spec();
    spec.optimizer.name = "SGD".into();
    assert!(validate_config(&spec).is_ok());
}

#[test]
fn test_invalid_learning_rate() {
    let mut spec = create_valid_spec();
    spec.optimizer.lr = 0.0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidLearningRate(_))));

    spec.optimizer.lr = 1.5;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidLearningRate(_))));
}

#[test]
fn test_invalid_momentum_and_decay() {
    let mut spec = create_valid_spec();
    spec.optimizer = OptimSpec::new("sgd", 0.1).with_param("momentum", 1.0);
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidMomentum(_))));

    let mut spec = create_valid_spec();
    spec.arch_optimizer = OptimSpec::new("adam", 0.1).with_param("weight_decay", -1.0);
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidWeightDecay(_))));
}

#[test]
fn test_invalid_temperature() {
    let mut spec = create_valid_spec();
    spec.temperature.end_temp = 3.0;
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidTemperature(_)));
    assert!(err.to_string().contains("start_temp"));
}

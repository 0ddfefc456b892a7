//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{OptimSpec, SearchSpec};
use std::collections::HashSet;

const VALID_OPTIMIZERS: [&str; 2] = ["adam", "sgd"];

/// Validate a search specification
///
/// Checks:
/// - Sizes are non-zero (at least two classes)
/// - Each mixture offers at least two uniquely named candidates
/// - Optimizer names and numeric settings are in range
/// - The temperature schedule anneals downward
pub fn validate_config(spec: &SearchSpec) -> Result<(), ValidationError> {
    if spec.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(spec.epochs));
    }

    let data = &spec.data;
    if data.samples == 0 {
        return Err(ValidationError::InvalidSamples(data.samples));
    }
    if data.features == 0 {
        return Err(ValidationError::InvalidFeatures(data.features));
    }
    if data.classes < 2 {
        return Err(ValidationError::InvalidClasses(data.classes));
    }
    if data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(data.batch_size));
    }

    if spec.model.hidden == 0 {
        return Err(ValidationError::InvalidHiddenUnits(spec.model.hidden));
    }
    // Candidates are only instantiated when there is a mixture to hold them
    if spec.model.mixtures > 0 {
        let candidates = &spec.model.candidates;
        if candidates.len() < 2 {
            return Err(ValidationError::TooFewCandidates(candidates.len()));
        }
        let mut seen = HashSet::new();
        for candidate in candidates {
            if !seen.insert(candidate.name.as_str()) {
                return Err(ValidationError::DuplicateCandidate(candidate.name.clone()));
            }
        }
    }

    let multiplier = spec.mixture.cost_multiplier;
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(ValidationError::InvalidCostMultiplier(multiplier));
    }

    validate_optimizer(&spec.optimizer)?;
    validate_optimizer(&spec.arch_optimizer)?;

    spec.temperature
        .validate()
        .map_err(|e| ValidationError::InvalidTemperature(e.to_string()))?;

    Ok(())
}

fn validate_optimizer(optim: &OptimSpec) -> Result<(), ValidationError> {
    if !VALID_OPTIMIZERS.contains(&optim.name.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidOptimizer(optim.name.clone()));
    }

    // NaN fails the range check too
    if !(optim.lr > 0.0 && optim.lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate(optim.lr));
    }

    if let Some(momentum) = optim.param("momentum") {
        if !(0.0..1.0).contains(&momentum) {
            return Err(ValidationError::InvalidMomentum(momentum));
        }
    }

    if let Some(decay) = optim.param("weight_decay") {
        if decay.is_nan() || decay < 0.0 {
            return Err(ValidationError::InvalidWeightDecay(decay));
        }
    }

    Ok(())
}

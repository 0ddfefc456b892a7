//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid sample count: {0} (must be > 0)")]
    InvalidSamples(usize),

    #[error("Invalid feature count: {0} (must be > 0)")]
    InvalidFeatures(usize),

    #[error("Invalid class count: {0} (must be >= 2)")]
    InvalidClasses(usize),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid hidden units: {0} (must be > 0)")]
    InvalidHiddenUnits(usize),

    #[error("Too few candidate operations: {0} (need at least 2)")]
    TooFewCandidates(usize),

    #[error("Duplicate candidate operation name: {0}")]
    DuplicateCandidate(String),

    #[error("Invalid cost multiplier: {0} (must be finite and >= 0.0)")]
    InvalidCostMultiplier(f32),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid optimizer: {0} (must be one of: adam, sgd)")]
    InvalidOptimizer(String),

    #[error("Invalid momentum: {0} (must be in [0.0, 1.0))")]
    InvalidMomentum(f32),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid temperature schedule: {0}")]
    InvalidTemperature(String),
}

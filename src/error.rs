//! Error types for supernet construction, setup and search
//!
//! Every variant describes a wiring or configuration fault. None of them is
//! retried: the CLI reports the message and exits with a failure code.

use crate::config::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gumbel-nas operations.
pub type Result<T> = std::result::Result<T, NasError>;

/// Errors raised while building, setting up or running a supernet search.
#[derive(Error, Debug)]
pub enum NasError {
    /// A mixture needs at least two candidate operations.
    #[error("Mixture '{layer}' has {count} candidate operation(s), need at least 2")]
    TooFewOperations { layer: String, count: usize },

    /// Candidate operation names within one mixture must be unique.
    #[error("Mixture '{layer}' has duplicate operation name '{name}'")]
    DuplicateOperation { layer: String, name: String },

    /// The arch/non-arch split does not cover the trainable set exactly once.
    #[error(
        "Parameter partition mismatch: {arch} arch + {non_arch} non-arch != {total} trainable\n  → A parameter is owned twice or was missed by graph traversal"
    )]
    PartitionMismatch { arch: usize, non_arch: usize, total: usize },

    /// Gradient list does not line up with the parameter list it was built from.
    #[error("Gradient ordering mismatch at index {index}: {message}")]
    OrderingInvariant { index: usize, message: String },

    /// A cost estimator returned NaN or an infinite cost.
    #[error("Mixture '{layer}': operation '{op}' has non-finite cost {cost}")]
    InvalidCost { layer: String, op: String, cost: f32 },

    /// Temperature schedule parameters are inconsistent.
    #[error("Invalid temperature schedule: {0}")]
    InvalidSchedule(String),

    /// Shapes disagree between layers or between candidates of a mixture.
    #[error("Shape mismatch in '{layer}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch { layer: String, expected: Vec<usize>, actual: Vec<usize> },

    /// A module was run before `build`.
    #[error("Module '{0}' used before it was built")]
    NotBuilt(String),

    /// `train_step` was called before `setup`.
    #[error("Supernet used before setup()\n  → Call setup(optimizer, arch_optimizer, loss, metrics) first")]
    NotSetUp,

    /// Search configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    /// Search configuration could not be parsed.
    #[error("Invalid configuration syntax in {path}:\n  {message}")]
    ConfigParsing { path: PathBuf, message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl NasError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_operations_message() {
        let err = NasError::TooFewOperations { layer: "mixture_0".into(), count: 1 };
        assert_eq!(
            err.to_string(),
            "Mixture 'mixture_0' has 1 candidate operation(s), need at least 2"
        );
    }

    #[test]
    fn test_partition_mismatch_names_counts() {
        let err = NasError::PartitionMismatch { arch: 2, non_arch: 3, total: 6 };
        let msg = err.to_string();
        assert!(msg.contains("2 arch + 3 non-arch != 6 trainable"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: NasError = ValidationError::InvalidEpochs(0).into();
        assert!(matches!(err, NasError::Config(_)));
        assert!(err.to_string().contains("Invalid epochs: 0"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = NasError::io(
            "reading search.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("reading search.yaml"));
    }
}

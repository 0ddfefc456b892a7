//! YAML schema for declarative architecture searches

use crate::nas::{SampleMode, TemperatureSchedule};
use crate::nn::Activation;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete search specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Seed for weight initialization, Gumbel sampling and synthetic data
    #[serde(default)]
    pub seed: u64,

    /// Number of search epochs
    pub epochs: usize,

    /// Synthetic data configuration
    pub data: DataSpec,

    /// Supernet layout
    pub model: ModelSpec,

    /// Settings shared by every mixture layer
    #[serde(default)]
    pub mixture: MixtureSpec,

    /// Optimizer for the network weights
    pub optimizer: OptimSpec,

    /// Optimizer for the mixture preference vectors
    pub arch_optimizer: OptimSpec,

    /// Temperature annealing schedule
    #[serde(default)]
    pub temperature: TemperatureSchedule,

    /// Check gradient/parameter ordering on every step
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub verify_ordering: bool,
}

/// Synthetic classification data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSpec {
    pub samples: usize,
    pub features: usize,
    pub classes: usize,
    pub batch_size: usize,
}

/// Supernet layout: `stem -> mixture x N -> head`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Width of the stem and of every candidate operation
    pub hidden: usize,

    /// Number of stacked mixture layers
    #[serde(default = "default_mixtures")]
    pub mixtures: usize,

    /// Candidate operations offered by each mixture layer
    pub candidates: Vec<CandidateSpec>,
}

fn default_mixtures() -> usize {
    1
}

/// Kind of candidate operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Dense,
    Identity,
    Zero,
}

/// One named candidate operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub kind: CandidateKind,
    /// Only meaningful for `dense`
    #[serde(default)]
    pub activation: Activation,
}

/// Mixture layer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MixtureSpec {
    #[serde(default)]
    pub cost_multiplier: f32,
    #[serde(default)]
    pub sample_mode: SampleMode,
}

/// Optimizer configuration
///
/// Optimizer-specific settings (`momentum`, `beta1`, `beta2`, `eps`,
/// `weight_decay`) are collected into `params`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimSpec {
    pub name: String,
    pub lr: f32,
    #[serde(flatten)]
    pub params: HashMap<String, serde_json::Value>,
}

impl OptimSpec {
    pub fn new(name: impl Into<String>, lr: f32) -> Self {
        Self { name: name.into(), lr, params: HashMap::new() }
    }

    /// Numeric setting from `params`
    pub fn param(&self, key: &str) -> Option<f32> {
        self.params.get(key).and_then(serde_json::Value::as_f64).map(|v| v as f32)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f32) -> Self {
        self.params.insert(key.into(), serde_json::json!(value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r"
epochs: 3
data:
  samples: 64
  features: 4
  classes: 3
  batch_size: 16
model:
  hidden: 8
  candidates:
    - name: dense_relu
      kind: dense
      activation: relu
    - name: skip
      kind: identity
optimizer:
  name: sgd
  lr: 0.05
arch_optimizer:
  name: adam
  lr: 0.01
";

    #[test]
    fn test_deserialize_minimal_config() {
        let spec: SearchSpec = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(spec.seed, 0);
        assert_eq!(spec.epochs, 3);
        assert_eq!(spec.model.mixtures, 1);
        assert_eq!(spec.model.candidates.len(), 2);
        assert_eq!(spec.model.candidates[0].activation, Activation::Relu);
        assert_eq!(spec.model.candidates[1].kind, CandidateKind::Identity);
        assert_eq!(spec.model.candidates[1].activation, Activation::None);
        assert_eq!(spec.mixture.cost_multiplier, 0.0);
        assert_eq!(spec.mixture.sample_mode, SampleMode::PerExample);
        assert_eq!(spec.temperature, TemperatureSchedule::default());
        assert!(!spec.verify_ordering);
        assert!(spec.optimizer.params.is_empty());
    }

    #[test]
    fn test_deserialize_full_config() {
        let yaml = r#"
seed: 42
epochs: 20
data: { samples: 120, features: 4, classes: 3, batch_size: 24 }
model:
  hidden: 6
  mixtures: 2
  candidates:
    - { name: dense_tanh, kind: dense, activation: tanh }
    - { name: none, kind: zero }
mixture:
  cost_multiplier: 0.001
  sample_mode: shared
optimizer:
  name: sgd
  lr: 0.1
  momentum: 0.9
arch_optimizer:
  name: adam
  lr: 0.003
  beta1: 0.5
  weight_decay: 0.001
temperature:
  start_epoch: 2
  final_epoch: 18
  start_temp: 5.0
  end_temp: 0.2
verify_ordering: "true"
"#;
        let spec: SearchSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.seed, 42);
        assert_eq!(spec.model.mixtures, 2);
        assert_eq!(spec.mixture.sample_mode, SampleMode::Shared);
        assert_eq!(spec.optimizer.param("momentum"), Some(0.9));
        assert_eq!(spec.arch_optimizer.param("beta1"), Some(0.5));
        assert_eq!(spec.arch_optimizer.param("weight_decay"), Some(0.001));
        assert_eq!(spec.temperature.final_epoch, 18);
        assert!(spec.verify_ordering);
    }

    #[test]
    fn test_unknown_candidate_kind_rejected() {
        let yaml = MINIMAL.replace("kind: identity", "kind: conv");
        assert!(serde_yaml::from_str::<SearchSpec>(&yaml).is_err());
    }

    #[test]
    fn test_bad_lenient_bool_rejected() {
        let yaml = format!("{MINIMAL}verify_ordering: \"maybe\"\n");
        let err = serde_yaml::from_str::<SearchSpec>(&yaml).unwrap_err();
        assert!(err.to_string().contains("expected 'true' or 'false'"));
    }

    #[test]
    fn test_optim_spec_params() {
        let spec = OptimSpec::new("sgd", 0.1).with_param("momentum", 0.5);
        assert_eq!(spec.param("momentum"), Some(0.5));
        assert_eq!(spec.param("beta1"), None);
    }
}

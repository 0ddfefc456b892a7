//! Architecture genotype: per-layer operation probabilities

use crate::autograd::softmax_slice;
use crate::nn::{MixtureHandle, ParamRegistry, Parameter};
use crate::train::{CallbackAction, CallbackContext, TrainerCallback};
use serde::{Serialize, Serializer};

fn ordered_map<S: Serializer>(ops: &[(String, f32)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(ops.iter().map(|(name, p)| (name, p)))
}

/// Selection probabilities of one mixture layer, in operation order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerGenotype {
    pub layer: String,
    #[serde(serialize_with = "ordered_map")]
    pub ops: Vec<(String, f32)>,
}

impl LayerGenotype {
    /// Highest-probability operation (first one on ties)
    pub fn dominant(&self) -> Option<&(String, f32)> {
        self.ops.iter().fold(None, |best: Option<&(String, f32)>, op| match best {
            Some(b) if b.1 >= op.1 => Some(b),
            _ => Some(op),
        })
    }

    /// Probability assigned to `op`
    pub fn probability(&self, op: &str) -> Option<f32> {
        self.ops.iter().find(|(name, _)| name == op).map(|(_, p)| *p)
    }
}

/// Current architecture: one [`LayerGenotype`] per mixture, in build order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Genotype {
    pub layers: Vec<LayerGenotype>,
}

impl Genotype {
    /// Softmax of every handle's preference vector
    pub fn from_handles(handles: &[MixtureHandle]) -> Self {
        let layers = handles
            .iter()
            .map(|h| {
                let probs = softmax_slice(&h.preference.tensor.to_vec());
                LayerGenotype { layer: h.layer.clone(), ops: h.op_names.iter().cloned().zip(probs).collect() }
            })
            .collect();
        Self { layers }
    }

    /// Genotype of every mixture in `registry`
    pub fn from_registry(registry: &ParamRegistry) -> Self {
        Self::from_handles(registry.mixtures())
    }

    /// `(layer, op)` of the most probable operation per layer
    pub fn dominant_ops(&self) -> Vec<(String, String)> {
        self.layers
            .iter()
            .filter_map(|l| l.dominant().map(|(op, _)| (l.layer.clone(), op.clone())))
            .collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }
}

/// One epoch-end genotype report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenotypeReport {
    pub epoch: usize,
    pub genotype: Genotype,
}

/// Reports the genotype at the end of every epoch
///
/// Read-only: it never writes to the preference vectors it watches.
pub struct GenotypeWatcher {
    handles: Vec<MixtureHandle>,
    reports: Vec<GenotypeReport>,
}

impl GenotypeWatcher {
    pub fn new(registry: &ParamRegistry) -> Self {
        Self { handles: registry.mixtures().to_vec(), reports: Vec::new() }
    }

    /// Preference parameters being watched
    pub fn preferences(&self) -> Vec<&Parameter> {
        self.handles.iter().map(|h| &h.preference).collect()
    }

    /// Genotype from the current preference values
    pub fn genotype(&self) -> Genotype {
        Genotype::from_handles(&self.handles)
    }

    /// Log the genotype for `epoch` and keep it as a report
    pub fn report(&mut self, epoch: usize) -> &GenotypeReport {
        let genotype = self.genotype();
        log::info!("Genotype: epoch: {epoch} {}", genotype.to_json());
        self.reports.push(GenotypeReport { epoch, genotype });
        &self.reports[self.reports.len() - 1]
    }

    /// Every report so far, oldest first
    pub fn reports(&self) -> &[GenotypeReport] {
        &self.reports
    }
}

impl TrainerCallback for GenotypeWatcher {
    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.report(ctx.epoch);
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "GenotypeWatcher"
    }
}

//! Parameters, ids and the model-scoped registry

use crate::autograd::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Unique handle issued by [`ParamRegistry`] when a parameter is created
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParamId(usize);

impl ParamId {
    /// Raw index (creation order within the registry)
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Named tensor owned by a module
#[derive(Clone, Debug)]
pub struct Parameter {
    pub id: ParamId,
    pub name: String,
    pub tensor: Tensor,
    pub trainable: bool,
}

/// Shared, non-trainable temperature scalar of one mixture layer
///
/// The layer reads it on every forward pass; the temperature scheduler
/// writes it once per epoch.
#[derive(Clone, Debug)]
pub struct Temperature(Rc<Cell<f32>>);

impl Temperature {
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value);
    }

    /// Whether two handles refer to the same slot
    pub fn same_slot(&self, other: &Temperature) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// What a mixture layer publishes about itself when it is built
#[derive(Clone, Debug)]
pub struct MixtureHandle {
    /// Layer name
    pub layer: String,
    /// Candidate operation names, in preference-vector order
    pub op_names: Vec<String>,
    /// Learnable preference vector (the architecture parameter)
    pub preference: Parameter,
    /// Static per-operation cost, `[k, 1]`, never trained
    pub costs: Parameter,
    /// Sampling temperature
    pub temperature: Temperature,
}

/// Issues parameter ids and collects mixture handles for one model
///
/// Modules create their parameters through the registry during `build`;
/// mixture layers additionally register a [`MixtureHandle`]. The registry
/// also owns the generator used for weight initialization.
pub struct ParamRegistry {
    parameters: Vec<Parameter>,
    mixtures: Vec<MixtureHandle>,
    rng: StdRng,
}

impl ParamRegistry {
    /// Create an empty registry whose initializers draw from `seed`
    pub fn new(seed: u64) -> Self {
        Self { parameters: Vec::new(), mixtures: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }

    /// Create a parameter around `data`
    ///
    /// The tensor is rebuilt so that `requires_grad` follows `trainable`.
    pub fn create(&mut self, name: impl Into<String>, data: Tensor, trainable: bool) -> Parameter {
        let tensor = Tensor::with_shape(data.data().clone(), data.shape().to_vec(), trainable);
        let param = Parameter { id: ParamId(self.parameters.len()), name: name.into(), tensor, trainable };
        self.parameters.push(param.clone());
        param
    }

    /// Record a built mixture layer
    pub fn register_mixture(&mut self, handle: MixtureHandle) {
        self.mixtures.push(handle);
    }

    /// Mixture layers in build order
    pub fn mixtures(&self) -> &[MixtureHandle] {
        &self.mixtures
    }

    /// Default name for the next unnamed mixture layer
    pub fn next_mixture_name(&self) -> String {
        format!("mixture_{}", self.mixtures.len())
    }

    /// Every parameter created so far, trainable or not
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up a parameter by id
    pub fn get(&self, id: ParamId) -> Option<&Parameter> {
        self.parameters.get(id.0)
    }

    /// Generator for weight initialization
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

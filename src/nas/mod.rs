//! Differentiable architecture search with Gumbel-softmax mixtures
//!
//! - [`MixtureLayer`]: relaxed categorical choice between candidate operations
//! - [`SupernetModel`]: arch/non-arch parameter partition and the joint step
//! - [`TemperatureScheduler`]: per-epoch linear temperature annealing
//! - [`GenotypeWatcher`]: per-epoch report of the operation probabilities
//! - [`CostEstimator`]: static per-operation cost used by the cost loss
//!
//! # Example
//!
//! ```
//! use gumbel_nas::nas::{MixtureLayer, SupernetModel};
//! use gumbel_nas::nn::{Dense, Identity, Module, Sequential};
//! use gumbel_nas::optim::{Adam, SGD};
//! use gumbel_nas::train::{Batch, MSELoss};
//! use gumbel_nas::autograd::Tensor;
//!
//! let mixture = MixtureLayer::new(
//!     vec![
//!         ("dense".to_string(), Box::new(Dense::new(4)) as Box<dyn Module>),
//!         ("skip".to_string(), Box::new(Identity::new())),
//!     ],
//!     0.0,
//! )
//! .unwrap();
//! let network = Sequential::new(vec![Box::new(mixture), Box::new(Dense::new(1))]);
//!
//! let mut model = SupernetModel::new(Box::new(network), &[8, 4], 0).unwrap();
//! model
//!     .setup(Box::new(SGD::new(0.1, 0.0)), Box::new(Adam::default_params(0.01)), Box::new(MSELoss), vec![])
//!     .unwrap();
//!
//! let batch = Batch::new(Tensor::zeros_shape(&[8, 4], false), Tensor::zeros_shape(&[8, 1], false));
//! let metrics = model.train_step(&batch).unwrap();
//! assert!(metrics.loss.is_finite());
//! ```

mod cost;
mod genotype;
mod mixture;
mod schedule;
mod supernet;


pub use cost::{single_example_shape, CostEstimator, FlopCounter};
pub use genotype::{Genotype, GenotypeReport, GenotypeWatcher, LayerGenotype};
pub use mixture::{MixtureLayer, SampleMode};
pub use schedule::{TemperatureSchedule, TemperatureScheduler};
pub use supernet::{ParamPartition, SearchResult, StepMetrics, SupernetModel};

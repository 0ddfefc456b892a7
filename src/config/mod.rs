//! Declarative search configuration
//!
//! A YAML file describes the synthetic data, the supernet layout, both
//! optimizers and the temperature schedule:
//!
//! ```yaml
//! seed: 0
//! epochs: 20
//! data: { samples: 240, features: 4, classes: 3, batch_size: 24 }
//! model:
//!   hidden: 8
//!   mixtures: 2
//!   candidates:
//!     - { name: dense_relu, kind: dense, activation: relu }
//!     - { name: skip, kind: identity }
//!     - { name: none, kind: zero }
//! optimizer: { name: sgd, lr: 0.05, momentum: 0.9 }
//! arch_optimizer: { name: adam, lr: 0.01 }
//! temperature: { start_epoch: 0, final_epoch: 15, start_temp: 5.0, end_temp: 0.1 }
//! ```

mod builder;
mod cli;
mod schema;
mod search;
mod validate;

pub use cli::{Cli, Command, SearchArgs, ValidateArgs};
pub use builder::{build_callbacks, build_candidates, build_data, build_model, build_network, build_optimizer};
pub use schema::{CandidateKind, CandidateSpec, DataSpec, MixtureSpec, ModelSpec, OptimSpec, SearchSpec};
pub use search::{apply_overrides, load_config, parse_config, run_search, search_from_yaml};
pub use validate::{validate_config, ValidationError};

//! YAML-driven architecture search
//!
//! Loads a search spec, builds the supernet on synthetic data and runs the
//! search with temperature annealing and genotype reporting.

mod loader;

#[cfg(test)]
mod tests;

pub use loader::{apply_overrides, load_config, parse_config, run_search, search_from_yaml};

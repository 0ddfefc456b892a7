//! Main entry points for YAML-based searches

use crate::config::builder::{build_callbacks, build_data, build_model};
use crate::config::cli::SearchArgs;
use crate::config::schema::SearchSpec;
use crate::config::validate::validate_config;
use crate::error::{NasError, Result};
use crate::nas::SearchResult;
use std::fs;
use std::path::Path;

/// Parse a search spec from YAML text without validating it
pub fn parse_config(yaml: &str) -> std::result::Result<SearchSpec, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Load, parse and validate a search spec
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SearchSpec> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .map_err(|e| NasError::io(format!("Failed to read config file {}", path.display()), e))?;

    let spec = parse_config(&yaml).map_err(|e| NasError::ConfigParsing {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    validate_config(&spec)?;
    Ok(spec)
}

/// Apply command-line overrides and re-validate
pub fn apply_overrides(spec: &mut SearchSpec, args: &SearchArgs) -> Result<()> {
    if let Some(epochs) = args.epochs {
        spec.epochs = epochs;
    }
    if let Some(seed) = args.seed {
        spec.seed = seed;
    }
    validate_config(spec)?;
    Ok(())
}

/// Run a search from a validated spec
pub fn run_search(spec: &SearchSpec) -> Result<SearchResult> {
    log::info!(
        "Search: {} epoch(s), {} mixture layer(s) x {} candidate(s), seed {}",
        spec.epochs,
        spec.model.mixtures,
        spec.model.candidates.len(),
        spec.seed
    );

    let mut model = build_model(spec)?;
    let mut callbacks = build_callbacks(spec, &model)?;
    let batches = build_data(spec);
    log::debug!("{} batch(es) of up to {} examples", batches.len(), spec.data.batch_size);

    let result = model.fit(&batches, spec.epochs, &mut callbacks)?;
    log::info!(
        "Search finished at epoch {} with loss {:.5} in {:.2}s",
        result.final_epoch,
        result.final_loss,
        result.elapsed_secs
    );
    Ok(result)
}

/// Run a search from a YAML configuration file
///
/// # Example
///
/// ```no_run
/// use gumbel_nas::config::search_from_yaml;
///
/// let result = search_from_yaml("configs/search.yaml")?;
/// println!("{}", result.genotype.to_json());
/// # Ok::<(), gumbel_nas::NasError>(())
/// ```
pub fn search_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<SearchResult> {
    let spec = load_config(config_path)?;
    run_search(&spec)
}

//! Tests for config loading and the search entry points

use super::*;
use crate::config::validate::tests::create_valid_spec;
use crate::error::NasError;
use std::io::Write;
use tempfile::NamedTempFile;

const VALID: &str = r"
seed: 3
epochs: 2
data:
  samples: 24
  features: 4
  classes: 3
  batch_size: 12
model:
  hidden: 5
  mixtures: 1
  candidates:
    - { name: dense_relu, kind: dense, activation: relu }
    - { name: skip, kind: identity }
optimizer:
  name: sgd
  lr: 0.1
arch_optimizer:
  name: adam
  lr: 0.01
temperature:
  start_epoch: 0
  final_epoch: 1
  start_temp: 1.0
  end_temp: 0.5
";

fn write_temp(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_valid_config() {
    let file = write_temp(VALID);
    let spec = load_config(file.path()).unwrap();
    assert_eq!(spec.seed, 3);
    assert_eq!(spec.optimizer.name, "sgd");
    assert_eq!(spec.data.batch_size, 12);
}

#[test]
fn test_load_invalid_config() {
    let file = write_temp(&VALID.replace("batch_size: 12", "batch_size: 0"));
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, NasError::Config(_)));
    assert!(err.to_string().contains("Invalid batch size: 0"));
}

#[test]
fn test_load_malformed_yaml() {
    let file = write_temp("this is not valid yaml: [}");
    let err = load_config(file.path()).unwrap_err();
    match err {
        NasError::ConfigParsing { path, .. } => assert_eq!(path, file.path()),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, NasError::Io { .. }));
    assert!(err.to_string().contains("missing.yaml"));
}

#[test]
fn test_parse_config_skips_validation() {
    let spec = parse_config(&VALID.replace("epochs: 2", "epochs: 0")).unwrap();
    assert_eq!(spec.epochs, 0);
}

#[test_log::test]
fn test_search_from_yaml() {
    let file = write_temp(VALID);
    let result = search_from_yaml(file.path()).unwrap();
    assert_eq!(result.final_epoch, 1);
    assert!(result.final_loss.is_finite());
    assert_eq!(result.genotype.layers.len(), 1);
    assert_eq!(result.genotype.layers[0].layer, "mixture_0");
}

#[test]
fn test_run_search_is_reproducible() {
    let mut spec = create_valid_spec();
    spec.epochs = 2;
    let a = run_search(&spec).unwrap();
    let b = run_search(&spec).unwrap();
    assert_eq!(a.final_loss, b.final_loss);
    assert_eq!(a.genotype, b.genotype);
}

#[test]
fn test_apply_overrides() {
    let mut spec = create_valid_spec();
    let args = crate::config::SearchArgs {
        config: "search.yaml".into(),
        epochs: Some(7),
        seed: Some(99),
        output: None,
    };
    apply_overrides(&mut spec, &args).unwrap();
    assert_eq!(spec.epochs, 7);
    assert_eq!(spec.seed, 99);

    let zero = crate::config::SearchArgs { epochs: Some(0), seed: None, ..args };
    assert!(matches!(apply_overrides(&mut spec, &zero), Err(NasError::Config(_))));
}

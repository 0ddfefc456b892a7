//! End-to-end search tests
//!
//! Runs short searches through the public API: the bundled YAML config, a
//! hand-assembled supernet with callbacks, and the cost penalty.

use gumbel_nas::config::{build_model, load_config, run_search, search_from_yaml};
use gumbel_nas::nas::{GenotypeWatcher, MixtureLayer, SupernetModel, TemperatureSchedule, TemperatureScheduler};
use gumbel_nas::nn::{Activation, Dense, Identity, Module, Sequential, Zero};
use gumbel_nas::optim::{Adam, SGD};
use gumbel_nas::train::{
    synthetic, Accuracy, CallbackAction, CallbackContext, CallbackManager, CrossEntropyLoss, TrainerCallback,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn bundled_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/search.yaml")
}

fn candidates(width: usize) -> Vec<(String, Box<dyn Module>)> {
    vec![
        ("dense_relu".to_string(), Box::new(Dense::new(width).with_activation(Activation::Relu)) as Box<dyn Module>),
        ("skip".to_string(), Box::new(Identity::new())),
        ("none".to_string(), Box::new(Zero::new())),
    ]
}

/// Records the temperature seen by the first mixture at every epoch start
struct TemperatureProbe {
    temperature: gumbel_nas::nn::Temperature,
    seen: Rc<RefCell<Vec<f32>>>,
}

impl TrainerCallback for TemperatureProbe {
    fn on_epoch_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        self.seen.borrow_mut().push(self.temperature.get());
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "TemperatureProbe"
    }
}

#[test]
fn bundled_config_is_valid() {
    let spec = load_config(bundled_config()).expect("bundled config loads");
    assert_eq!(spec.model.mixtures, 2);
    assert_eq!(spec.model.candidates.len(), 4);

    let model = build_model(&spec).expect("bundled config builds");
    assert_eq!(model.partition().map(|p| p.arch.len()), Some(2));
}

#[test_log::test]
fn bundled_config_search_runs() {
    let mut spec = load_config(bundled_config()).unwrap();
    spec.epochs = 3;
    spec.data.samples = 48;

    let result = run_search(&spec).unwrap();
    assert_eq!(result.final_epoch, 2);
    assert!(result.final_loss.is_finite());
    assert_eq!(result.genotype.layers.len(), 2);
    for layer in &result.genotype.layers {
        let total: f32 = layer.ops.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert_eq!(layer.ops.len(), 4);
    }
}

#[test]
fn search_from_yaml_matches_run_search() {
    let mut spec = load_config(bundled_config()).unwrap();
    spec.epochs = 20;
    let direct = run_search(&spec).unwrap();
    let from_file = search_from_yaml(bundled_config()).unwrap();
    assert_eq!(direct.genotype, from_file.genotype);
    assert_eq!(direct.final_loss, from_file.final_loss);
}

#[test]
fn callbacks_see_annealed_temperatures() {
    let network = Sequential::new(vec![
        Box::new(Dense::new(5).with_activation(Activation::Relu)),
        Box::new(MixtureLayer::new(candidates(5), 0.0).unwrap()),
        Box::new(Dense::new(3)),
    ]);
    let mut model = SupernetModel::new(Box::new(network), &[12, 4], 8).unwrap();
    model
        .setup(
            Box::new(SGD::new(0.05, 0.9)),
            Box::new(Adam::default_params(0.01)),
            Box::new(CrossEntropyLoss),
            vec![Box::new(Accuracy::default())],
        )
        .unwrap();

    let schedule = TemperatureSchedule { start_epoch: 1, final_epoch: 3, start_temp: 3.0, end_temp: 1.0 };
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut callbacks = CallbackManager::new();
    // The scheduler runs first, so the probe sees this epoch's value
    callbacks.add(TemperatureScheduler::new(model.registry(), schedule).unwrap());
    callbacks.add(TemperatureProbe {
        temperature: model.registry().mixtures()[0].temperature.clone(),
        seen: Rc::clone(&seen),
    });
    callbacks.add(GenotypeWatcher::new(model.registry()));

    let batches = synthetic::blobs(24, 4, 3, 12, 0);
    let result = model.fit(&batches, 5, &mut callbacks).unwrap();

    assert_eq!(result.final_epoch, 4);
    let seen = seen.borrow();
    let expected = [3.0, 3.0, 2.0, 1.0, 1.0];
    assert_eq!(seen.len(), expected.len());
    for (got, want) in seen.iter().zip(expected) {
        assert!((got - want).abs() < 1e-5, "temperature {got}, expected {want}");
    }
}

#[test]
fn search_learns_separable_data() {
    let mut spec = load_config(bundled_config()).unwrap();
    spec.epochs = 25;
    spec.mixture.cost_multiplier = 0.0;

    let mut model = build_model(&spec).unwrap();
    let batches = gumbel_nas::config::build_data(&spec);
    let mut callbacks = gumbel_nas::config::build_callbacks(&spec, &model).unwrap();
    model.fit(&batches, spec.epochs, &mut callbacks).unwrap();

    let accuracy: f32 = batches
        .iter()
        .map(|b| model.evaluate(b).unwrap().running["accuracy"])
        .sum::<f32>()
        / batches.len() as f32;
    assert!(accuracy > 0.6, "accuracy {accuracy}");
}

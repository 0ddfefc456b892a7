//! Property-based tests for configuration validation

use super::tests::create_valid_spec;
use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = SearchSpec> {
    (
        1usize..64,   // batch_size
        1e-6f32..1.0, // lr
        1e-6f32..1.0, // arch lr
        1usize..100,  // epochs
        0usize..4,    // mixtures
        0.0f32..0.99, // momentum
    )
        .prop_map(|(batch_size, lr, arch_lr, epochs, mixtures, momentum)| {
            let mut spec = create_valid_spec();
            spec.data.batch_size = batch_size;
            spec.epochs = epochs;
            spec.model.mixtures = mixtures;
            spec.optimizer = OptimSpec::new("sgd", lr).with_param("momentum", momentum);
            spec.arch_optimizer = OptimSpec::new("adam", arch_lr);
            spec
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_lr_above_one_fails(lr in 1.0001f32..100.0) {
        let mut spec = create_valid_spec();
        spec.arch_optimizer.lr = lr;
        prop_assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidLearningRate(_))));
    }

    #[test]
    fn prop_rising_schedule_fails(start in 0.01f32..5.0, extra in 0.0f32..5.0) {
        let mut spec = create_valid_spec();
        spec.temperature.start_temp = start;
        spec.temperature.end_temp = start + extra;
        prop_assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidTemperature(_))));
    }
}

//! Property-based gradient checks for matmul, bias and activations

use super::test_utils::{finite_difference, max_abs_diff};
use crate::autograd::{add_bias, grad, matmul, softmax_rows, sum, tanh, Tensor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_matmul_gradient_check(
        a in prop::collection::vec(-2.0f32..2.0, 6),
        b in prop::collection::vec(-2.0f32..2.0, 6),
    ) {
        let ta = Tensor::from_shape_vec(&[2, 3], a.clone(), true);
        let tb = Tensor::from_shape_vec(&[3, 2], b.clone(), false);
        let grads = grad(&sum(&tanh(&matmul(&ta, &tb))), &[ta.clone()]);

        let numerical = finite_difference(
            |v| {
                let x = Tensor::from_shape_vec(&[2, 3], v.to_vec(), false);
                let y = Tensor::from_shape_vec(&[3, 2], b.clone(), false);
                tanh(&matmul(&x, &y)).data().sum()
            },
            &a,
            1e-3,
        );
        let analytical = grads[0].as_ref().expect("gradient should be available").to_vec();
        prop_assert!(max_abs_diff(&analytical, &numerical) < 2e-2);
    }

    #[test]
    fn prop_bias_gradient_check(
        bias in prop::collection::vec(-3.0f32..3.0, 3),
        x in prop::collection::vec(-3.0f32..3.0, 6),
    ) {
        let tb = Tensor::from_vec(bias.clone(), true);
        let tx = Tensor::from_shape_vec(&[2, 3], x.clone(), false);
        let grads = grad(&sum(&tanh(&add_bias(&tx, &tb))), &[tb.clone()]);

        let numerical = finite_difference(
            |v| {
                let b = Tensor::from_vec(v.to_vec(), false);
                let a = Tensor::from_shape_vec(&[2, 3], x.clone(), false);
                tanh(&add_bias(&a, &b)).data().sum()
            },
            &bias,
            1e-3,
        );
        let analytical = grads[0].as_ref().expect("gradient should be available").to_vec();
        prop_assert!(max_abs_diff(&analytical, &numerical) < 2e-2);
    }

    #[test]
    fn prop_softmax_rows_sum_to_one(
        x in prop::collection::vec(-20.0f32..20.0, 12)
    ) {
        let s = softmax_rows(&Tensor::from_shape_vec(&[3, 4], x, false));
        for row in s.to_vec().chunks(4) {
            let total: f32 = row.iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn prop_softmax_rows_gradient_check(
        x in prop::collection::vec(-4.0f32..4.0, 6),
        w in prop::collection::vec(-1.0f32..1.0, 6),
    ) {
        // Weighted sum so the gradient is not trivially zero
        let weights = Tensor::from_shape_vec(&[2, 3], w.clone(), false);
        let a = Tensor::from_shape_vec(&[2, 3], x.clone(), true);
        let loss = sum(&crate::autograd::mul(&softmax_rows(&a), &weights));
        let grads = grad(&loss, &[a.clone()]);

        let numerical = finite_difference(
            |v| {
                let t = Tensor::from_shape_vec(&[2, 3], v.to_vec(), false);
                let s = softmax_rows(&t);
                let r: f32 = s.data().iter().zip(&w).map(|(p, q)| p * q).sum();
                r
            },
            &x,
            1e-3,
        );
        let analytical = grads[0].as_ref().expect("gradient should be available").to_vec();
        prop_assert!(max_abs_diff(&analytical, &numerical) < 1e-2);
    }
}

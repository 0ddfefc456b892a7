//! Stochastic Gradient Descent optimizer

use super::optimizer::{check_lengths, ensure_state};
use super::Optimizer;
use crate::autograd::Tensor;
use ndarray::Array1;

/// SGD optimizer with optional momentum
///
/// v = momentum * v - lr * grad; θ = θ + v
pub struct SGD {
    lr: f32,
    momentum: f32,
    t: u64,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self { lr, momentum, t: 0, velocities: Vec::new() }
    }

    /// Momentum coefficient
    pub fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Optimizer for SGD {
    fn apply_gradients(&mut self, grads: &[Option<Array1<f32>>], params: &[Tensor]) {
        check_lengths("SGD", grads, params);
        ensure_state(&mut self.velocities, params.len());
        self.t += 1;

        for (i, (grad, param)) in grads.iter().zip(params).enumerate() {
            let Some(grad) = grad else { continue };
            let mut data = param.data_mut();

            if self.momentum > 0.0 {
                let velocity =
                    self.velocities[i].get_or_insert_with(|| Array1::zeros(grad.len()));
                *velocity *= self.momentum;
                velocity.scaled_add(-self.lr, grad);
                *data += &*velocity;
            } else {
                data.scaled_add(-self.lr, grad);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn step_count(&self) -> u64 {
        self.t
    }

    fn name(&self) -> &'static str {
        "sgd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_sgd_plain_update() {
        let mut opt = SGD::new(0.1, 0.0);
        let param = Tensor::from_vec(vec![1.0, -1.0], true);

        opt.apply_gradients(&[Some(arr1(&[1.0, -2.0]))], &[param.clone()]);

        assert_abs_diff_eq!(param.data()[0], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(param.data()[1], -0.8, epsilon = 1e-6);
        assert_eq!(opt.step_count(), 1);
    }

    #[test]
    fn test_sgd_momentum_accumulates() {
        let mut opt = SGD::new(0.1, 0.9);
        let param = Tensor::from_vec(vec![0.0], true);
        let grads = [Some(arr1(&[1.0]))];

        opt.apply_gradients(&grads, &[param.clone()]);
        assert_abs_diff_eq!(param.data()[0], -0.1, epsilon = 1e-6);

        // v = 0.9 * -0.1 - 0.1 = -0.19
        opt.apply_gradients(&grads, &[param.clone()]);
        assert_abs_diff_eq!(param.data()[0], -0.29, epsilon = 1e-6);
        assert_eq!(opt.step_count(), 2);
    }

    #[test]
    fn test_sgd_quadratic_convergence() {
        // f(x) = x², minimum at 0
        let mut opt = SGD::new(0.1, 0.5);
        let param = Tensor::from_vec(vec![5.0], true);

        for _ in 0..100 {
            let x = param.data()[0];
            opt.apply_gradients(&[Some(arr1(&[2.0 * x]))], &[param.clone()]);
        }
        assert!(param.data()[0].abs() < 1e-3);
    }

    #[test]
    fn test_sgd_none_gradient_leaves_param() {
        let mut opt = SGD::new(0.1, 0.9);
        let a = Tensor::from_vec(vec![1.0], true);
        let b = Tensor::from_vec(vec![1.0], true);

        opt.apply_gradients(&[None, Some(arr1(&[1.0]))], &[a.clone(), b.clone()]);

        assert_eq!(a.data()[0], 1.0);
        assert_abs_diff_eq!(b.data()[0], 0.9, epsilon = 1e-6);
    }
}

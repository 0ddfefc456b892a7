//! Adam optimizer with optional decoupled weight decay

use super::optimizer::{check_lengths, ensure_state};
use super::Optimizer;
use crate::autograd::Tensor;
use ndarray::{Array1, Zip};

/// Adam optimizer
///
/// m_t = β₁ m + (1 - β₁) g
/// v_t = β₂ v + (1 - β₂) g²
/// θ_t = (1 - lr λ) θ - lr_t m_t / (√v_t + ε),  lr_t = lr √(1 - β₂ᵗ) / (1 - β₁ᵗ)
///
/// With `weight_decay = 0` this is plain Adam.
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>,
    v: Vec<Option<Array1<f32>>>,
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay: 0.0,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Adam with β₁ = 0.9, β₂ = 0.999, ε = 1e-8
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    /// Enable decoupled weight decay
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Weight decay coefficient
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    /// First moment buffers
    pub fn first_moments(&self) -> &[Option<Array1<f32>>] {
        &self.m
    }
}

impl Optimizer for Adam {
    fn apply_gradients(&mut self, grads: &[Option<Array1<f32>>], params: &[Tensor]) {
        check_lengths("Adam", grads, params);
        ensure_state(&mut self.m, params.len());
        ensure_state(&mut self.v, params.len());
        self.t += 1;

        let t = self.t as i32;
        let lr_t = self.lr * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t));
        let decay = 1.0 - self.lr * self.weight_decay;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        for (i, (grad, param)) in grads.iter().zip(params).enumerate() {
            let Some(grad) = grad else { continue };
            let m = self.m[i].get_or_insert_with(|| Array1::zeros(grad.len()));
            let v = self.v[i].get_or_insert_with(|| Array1::zeros(grad.len()));
            let mut data = param.data_mut();

            Zip::from(&mut *data).and(m).and(v).and(grad).for_each(|p, m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *p = decay * *p - lr_t * *m / (v.sqrt() + epsilon);
            });
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
        "adam"
    }
}

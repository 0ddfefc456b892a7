//! Relaxed categorical sampling and weighted mixing
//!
//! `relaxed_one_hot` is the Gumbel-softmax (Concrete) relaxation of a
//! categorical draw:
//!
//! ```text
//! y_bk = softmax_k((logit_k + g_bk) / τ),   g_bk = -ln(-ln(u_bk)),  u ~ U(0, 1)
//! ```
//!
//! Each row of `y` lies on the simplex; as τ → 0 the rows approach one-hot
//! vectors. The noise is drawn by the caller so that the op stays a pure
//! function of its inputs and is easy to check against finite differences.

use super::activations::{softmax_rows_grad, softmax_slice};
use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::{Array1, Array2};
use rand::Rng;
use std::rc::Rc;

/// Smallest uniform draw allowed, keeps `-ln(-ln(u))` finite
const UNIFORM_EPS: f32 = 1e-7;

/// Draw a `[rows, cols]` matrix of standard Gumbel noise
pub fn gumbel_noise<R: Rng>(rng: &mut R, rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |_| {
        let u: f32 = rng.random::<f32>().clamp(UNIFORM_EPS, 1.0 - UNIFORM_EPS);
        -(-u.ln()).ln()
    })
}

/// Draw one row of Gumbel noise and repeat it for every row
pub fn shared_gumbel_noise<R: Rng>(rng: &mut R, rows: usize, cols: usize) -> Array2<f32> {
    let row = gumbel_noise(rng, 1, cols);
    Array2::from_shape_fn((rows, cols), |(_, j)| row[[0, j]])
}

/// Relaxed one-hot sample from `logits` (`[k]`) with fixed `noise` (`[b, k]`)
///
/// Returns a `[b, k]` tensor whose rows sum to one. Gradients flow to `logits`
/// only; the noise and temperature are constants of the sample.
///
/// # Panics
///
/// Panics if the noise width differs from the number of logits or if the
/// temperature is not positive.
pub fn relaxed_one_hot(logits: &Tensor, noise: &Array2<f32>, temperature: f32) -> Tensor {
    let (rows, cols) = noise.dim();
    assert_eq!(logits.len(), cols, "relaxed_one_hot: {} logits, noise width {cols}", logits.len());
    assert!(temperature > 0.0, "relaxed_one_hot: temperature must be positive, got {temperature}");

    let output: Array1<f32> = {
        let l = logits.data();
        let mut out = Vec::with_capacity(rows * cols);
        let mut perturbed = vec![0.0f32; cols];
        for r in 0..rows {
            for (j, p) in perturbed.iter_mut().enumerate() {
                *p = l[j] + noise[[r, j]];
            }
            // Shift before dividing so a tiny temperature cannot overflow to ∞ - ∞
            let max = perturbed.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            for p in &mut perturbed {
                *p = (*p - max) / temperature;
            }
            out.extend(softmax_slice(&perturbed));
        }
        Array1::from(out)
    };
    let requires_grad = logits.requires_grad();

    let mut result = Tensor::with_shape(output.clone(), vec![rows, cols], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(RelaxedOneHotBackward {
            logits: logits.clone(),
            output,
            cols,
            temperature,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct RelaxedOneHotBackward {
    logits: Tensor,
    output: Array1<f32>,
    cols: usize,
    temperature: f32,
    result_grad: GradCell,
}

impl BackwardOp for RelaxedOneHotBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.logits.requires_grad() {
                // ∂L/∂logit_k = Σ_b (1/τ) y_bk (∂L/∂y_bk - Σ_j y_bj ∂L/∂y_bj)
                // Divide after the product: `1/τ` alone overflows for tiny τ
                let per_row = softmax_rows_grad(&self.output, grad, self.cols, 1.0);
                let mut grad_logits = Array1::zeros(self.cols);
                for (idx, g) in per_row.iter().enumerate() {
                    grad_logits[idx % self.cols] += g / self.temperature;
                }
                self.logits.accumulate_grad(grad_logits);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.logits.clone()]
    }
}

/// Per-example weighted sum of candidate outputs
///
/// `outputs` are `k` tensors of identical shape `[b, ...]`; `weights` is
/// `[b, k]`. Row `b` of the result is `Σ_k weights[b, k] * outputs[k][b, ...]`,
/// i.e. each weight is broadcast over the remaining output dimensions.
///
/// # Panics
///
/// Panics on an empty candidate list or mismatched shapes.
pub fn mix(outputs: &[Tensor], weights: &Tensor) -> Tensor {
    assert!(!outputs.is_empty(), "mix: no candidate outputs");
    let shape = outputs[0].shape().to_vec();
    let rows = outputs[0].rows();
    let width = outputs[0].row_len();
    let k = outputs.len();
    assert_eq!(weights.shape(), &[rows, k], "mix: weights {:?} for {k} outputs of {shape:?}", weights.shape());
    for out in outputs {
        assert_eq!(out.shape(), shape.as_slice(), "mix: candidate output shapes differ");
    }

    let data = {
        let w = weights.data();
        let mut acc = Array1::zeros(rows * width);
        for (op, out) in outputs.iter().enumerate() {
            let o = out.data();
            for r in 0..rows {
                let weight = w[r * k + op];
                for i in 0..width {
                    acc[r * width + i] += weight * o[r * width + i];
                }
            }
        }
        acc
    };
    let requires_grad = weights.requires_grad() || outputs.iter().any(Tensor::requires_grad);

    let mut result = Tensor::with_shape(data, shape, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MixBackward {
            outputs: outputs.to_vec(),
            weights: weights.clone(),
            rows,
            width,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MixBackward {
    outputs: Vec<Tensor>,
    weights: Tensor,
    rows: usize,
    width: usize,
    result_grad: GradCell,
}

impl BackwardOp for MixBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let k = self.outputs.len();
            let w = self.weights.data().clone();

            if self.weights.requires_grad() {
                // ∂L/∂w_bk = Σ_i ∂L/∂out_bi * o_k[b, i]
                let mut grad_w = Array1::zeros(self.rows * k);
                for (op, out) in self.outputs.iter().enumerate() {
                    let o = out.data();
                    for r in 0..self.rows {
                        let base = r * self.width;
                        grad_w[r * k + op] =
                            (0..self.width).map(|i| grad[base + i] * o[base + i]).sum::<f32>();
                    }
                }
                self.weights.accumulate_grad(grad_w);
            }

            for (op, out) in self.outputs.iter().enumerate() {
                if out.requires_grad() {
                    // ∂L/∂o_k[b, i] = w_bk * ∂L/∂out_bi
                    let grad_o = Array1::from_shape_fn(self.rows * self.width, |idx| {
                        w[(idx / self.width) * k + op] * grad[idx]
                    });
                    out.accumulate_grad(grad_o);
                }
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        let mut inputs = self.outputs.clone();
        inputs.push(self.weights.clone());
        inputs
    }
}

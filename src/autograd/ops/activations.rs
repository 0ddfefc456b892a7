//! Activation function autograd operations: relu, tanh, row softmax

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// ReLU activation
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    let requires_grad = a.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ReluBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReluBackward {
    a: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * (a > 0)
                let mask = self.a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
                self.a.accumulate_grad(grad * &mask);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Hyperbolic tangent activation
pub fn tanh(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::tanh);
    let requires_grad = a.requires_grad();

    let mut result = Tensor::with_shape(data.clone(), a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(TanhBackward {
            a: a.clone(),
            output: data,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct TanhBackward {
    a: Tensor,
    output: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for TanhBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂tanh/∂x = 1 - tanh²(x)
                let local = self.output.mapv(|y| 1.0 - y * y);
                self.a.accumulate_grad(grad * &local);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Numerically stable softmax of one row
pub(crate) fn softmax_slice(row: &[f32]) -> Vec<f32> {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = row.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Row-wise softmax: each `row_len()` slice of `a` is normalized independently
///
/// A 1-D tensor is treated as a single row.
pub fn softmax_rows(a: &Tensor) -> Tensor {
    let cols = if a.shape().len() > 1 { a.row_len() } else { a.len() };
    let output: Array1<f32> = {
        let data = a.data();
        let flat = data.to_vec();
        flat.chunks(cols.max(1)).flat_map(softmax_slice).collect()
    };
    let requires_grad = a.requires_grad();

    let mut result = Tensor::with_shape(output.clone(), a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SoftmaxRowsBackward {
            a: a.clone(),
            output,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SoftmaxRowsBackward {
    a: Tensor,
    output: Array1<f32>,
    cols: usize,
    result_grad: GradCell,
}

impl BackwardOp for SoftmaxRowsBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂x = y ⊙ (∂L/∂y - (y · ∂L/∂y)), per row
                let grad_a = softmax_rows_grad(&self.output, grad, self.cols, 1.0);
                self.a.accumulate_grad(grad_a);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Vector-Jacobian product of row softmax, scaled by `factor`
pub(crate) fn softmax_rows_grad(
    output: &Array1<f32>,
    grad: &Array1<f32>,
    cols: usize,
    factor: f32,
) -> Array1<f32> {
    let mut result = Array1::zeros(output.len());
    let rows = output.len() / cols.max(1);
    for r in 0..rows {
        let base = r * cols;
        let dot: f32 = (0..cols).map(|j| output[base + j] * grad[base + j]).sum();
        for j in 0..cols {
            result[base + j] = factor * output[base + j] * (grad[base + j] - dot);
        }
    }
    result
}

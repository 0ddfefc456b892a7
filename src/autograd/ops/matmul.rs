//! Matrix multiplication and bias broadcast

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::{Array1, Array2};
use std::rc::Rc;

/// Interpret a tensor as a `rows x cols` matrix, row-major
fn as_matrix(data: &Array1<f32>, rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(i, j)| data[i * cols + j])
}

fn flatten(m: Array2<f32>) -> Array1<f32> {
    m.iter().copied().collect()
}

/// Matrix product of `a` (`[m, k]`) and `b` (`[k, n]`), giving `[m, n]`
///
/// Leading dimensions of `a` beyond the first are flattened into `k`.
pub fn matmul(a: &Tensor, b: &Tensor) -> Tensor {
    let m = a.rows();
    let k = a.row_len();
    let n = b.row_len();
    assert_eq!(b.rows(), k, "matmul: inner dimensions {:?} x {:?}", a.shape(), b.shape());

    let a_mat = as_matrix(&a.data(), m, k);
    let b_mat = as_matrix(&b.data(), k, n);
    let data = flatten(a_mat.dot(&b_mat));
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::with_shape(data, vec![m, n], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad_mat = as_matrix(grad, self.m, self.n);
            if self.a.requires_grad() {
                // ∂L/∂A = ∂L/∂C · Bᵀ
                let b_mat = as_matrix(&self.b.data(), self.k, self.n);
                self.a.accumulate_grad(flatten(grad_mat.dot(&b_mat.t())));
            }
            if self.b.requires_grad() {
                // ∂L/∂B = Aᵀ · ∂L/∂C
                let a_mat = as_matrix(&self.a.data(), self.m, self.k);
                self.b.accumulate_grad(flatten(a_mat.t().dot(&grad_mat)));
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Add `bias` (`[n]`) to every row of `a` (`[m, n]`)
pub fn add_bias(a: &Tensor, bias: &Tensor) -> Tensor {
    let m = a.rows();
    let n = a.row_len();
    assert_eq!(bias.len(), n, "add_bias: bias {:?} for rows of {:?}", bias.shape(), a.shape());

    let data = {
        let a_data = a.data();
        let b_data = bias.data();
        Array1::from_shape_fn(m * n, |idx| a_data[idx] + b_data[idx % n])
    };
    let requires_grad = a.requires_grad() || bias.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            a: a.clone(),
            bias: bias.clone(),
            rows: m,
            cols: n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    a: Tensor,
    bias: Tensor,
    rows: usize,
    cols: usize,
    result_grad: GradCell,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.bias.requires_grad() {
                // ∂L/∂bias_j = Σ_i ∂L/∂out_ij
                let mut grad_bias = Array1::zeros(self.cols);
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        grad_bias[j] += grad[i * self.cols + j];
                    }
                }
                self.bias.accumulate_grad(grad_bias);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.bias.clone()]
    }
}

//! Basic autograd operations: add, mul, scale, sum, mean

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Add two tensors of the same size
///
/// The result takes the shape of `a`.
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: size mismatch {:?} vs {:?}", a.shape(), b.shape());
    let data = &*a.data() + &*b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad.clone());
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Multiply two tensors element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "mul: size mismatch {:?} vs {:?}", a.shape(), b.shape());
    let data = &*a.data() * &*b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MulBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MulBackward {
    a: Tensor,
    b: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for MulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * b
                let grad_a = grad * &*self.b.data();
                self.a.accumulate_grad(grad_a);
            }
            if self.b.requires_grad() {
                // ∂L/∂b = ∂L/∂out * a
                let grad_b = grad * &*self.a.data();
                self.b.accumulate_grad(grad_b);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Scale tensor by a scalar
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = &*a.data() * factor;
    let requires_grad = a.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ScaleBackward {
            a: a.clone(),
            factor,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ScaleBackward {
    a: Tensor,
    factor: f32,
    result_grad: GradCell,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad * self.factor);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Sum all elements into a scalar
pub fn sum(a: &Tensor) -> Tensor {
    reduce(a, 1.0)
}

/// Mean of all elements as a scalar
pub fn mean(a: &Tensor) -> Tensor {
    let n = a.len().max(1) as f32;
    reduce(a, 1.0 / n)
}

fn reduce(a: &Tensor, weight: f32) -> Tensor {
    let data = Array1::from(vec![a.data().sum() * weight]);
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ReduceBackward {
            a: a.clone(),
            weight,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReduceBackward {
    a: Tensor,
    weight: f32,
    result_grad: GradCell,
}

impl BackwardOp for ReduceBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a_i = ∂L/∂out * weight (broadcast)
                let grad_a = Array1::from_elem(self.a.len(), grad[0] * self.weight);
                self.a.accumulate_grad(grad_a);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Sum a list of scalar tensors
///
/// Returns a constant zero scalar for an empty list.
pub fn add_all(terms: &[Tensor]) -> Tensor {
    let mut iter = terms.iter();
    match iter.next() {
        Some(first) => iter.fold(first.clone(), |acc, t| add(&acc, t)),
        None => Tensor::zeros(1, false),
    }
}

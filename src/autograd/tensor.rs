//! Tensor with shared storage and gradient tracking

use super::BackwardOp;
use ndarray::Array1;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Shared gradient slot written by backward ops
pub type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

fn next_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Row-major tensor node in the computational graph
///
/// Cloning a tensor yields another handle to the same node: storage, gradient
/// and graph identity are shared. Layers, the parameter registry and the
/// optimizers all hold clones of the same parameter tensors, so an optimizer
/// update is immediately visible to the next forward pass.
#[derive(Clone)]
pub struct Tensor {
    id: u64,
    data: Rc<RefCell<Array1<f32>>>,
    grad: GradCell,
    shape: Vec<usize>,
    requires_grad: bool,
    backward_op: Option<Rc<dyn BackwardOp>>,
}

impl Tensor {
    /// Create a 1-D tensor from an array
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        let shape = vec![data.len()];
        Self::with_shape(data, shape, requires_grad)
    }

    /// Create a tensor with an explicit shape
    ///
    /// # Panics
    ///
    /// Panics if the shape does not describe exactly `data.len()` elements.
    pub fn with_shape(data: Array1<f32>, shape: Vec<usize>, requires_grad: bool) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "Shape {shape:?} does not match {} elements",
            data.len()
        );
        Self {
            id: next_node_id(),
            data: Rc::new(RefCell::new(data)),
            grad: Rc::new(RefCell::new(None)),
            shape,
            requires_grad,
            backward_op: None,
        }
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a tensor of the given shape from a row-major vector
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>, requires_grad: bool) -> Self {
        Self::with_shape(Array1::from(data), shape.to_vec(), requires_grad)
    }

    /// Create a 1-D tensor of zeros
    pub fn zeros(size: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(size), requires_grad)
    }

    /// Create a tensor of zeros with the given shape
    pub fn zeros_shape(shape: &[usize], requires_grad: bool) -> Self {
        let len: usize = shape.iter().product();
        Self::with_shape(Array1::zeros(len), shape.to_vec(), requires_grad)
    }

    /// Create a tensor filled with `value`
    pub fn full(shape: &[usize], value: f32, requires_grad: bool) -> Self {
        let len: usize = shape.iter().product();
        Self::with_shape(Array1::from_elem(len, value), shape.to_vec(), requires_grad)
    }

    /// Graph node identity, shared by clones and reshaped views
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Logical shape (row-major)
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the leading (batch) dimension
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    /// Number of elements per leading-dimension slice
    pub fn row_len(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// Borrow the underlying data
    pub fn data(&self) -> Ref<'_, Array1<f32>> {
        self.data.borrow()
    }

    /// Mutably borrow the underlying data
    ///
    /// Mutation bypasses the graph; it is meant for optimizer updates and
    /// scheduled hyperparameter writes, not for differentiable computation.
    pub fn data_mut(&self) -> RefMut<'_, Array1<f32>> {
        self.data.borrow_mut()
    }

    /// Copy the data out as a vector
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.borrow().to_vec()
    }

    /// First element (for scalar tensors)
    pub fn item(&self) -> f32 {
        self.data.borrow().first().copied().unwrap_or(0.0)
    }

    /// Whether gradients are tracked for this tensor
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Current gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Clear the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Add `grad` to the stored gradient
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut slot = self.grad.borrow_mut();
        match slot.as_mut() {
            Some(existing) => *existing += &grad,
            None => *slot = Some(grad),
        }
    }

    /// Shared gradient cell, captured by backward ops of results
    pub fn grad_cell(&self) -> GradCell {
        Rc::clone(&self.grad)
    }

    /// Backward op that produced this tensor
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Attach the backward op that produced this tensor
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// View of the same node with a different shape
    ///
    /// # Panics
    ///
    /// Panics if the element count changes.
    pub fn reshape(&self, shape: &[usize]) -> Tensor {
        assert_eq!(
            shape.iter().product::<usize>(),
            self.len(),
            "Cannot reshape {:?} to {shape:?}",
            self.shape
        );
        let mut view = self.clone();
        view.shape = shape.to_vec();
        view
    }

    /// Copy of the data cut off from the graph
    pub fn detach(&self) -> Tensor {
        Self::with_shape(self.data.borrow().clone(), self.shape.clone(), false)
    }

    /// Whether two handles point at the same storage
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_clone_shares_node() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = a.clone();
        b.data_mut()[0] = 5.0;
        assert_eq!(a.data()[0], 5.0);
        assert_eq!(a.id(), b.id());
        assert!(a.shares_storage(&b));
    }

    #[test]
    fn test_reshape_keeps_identity() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true);
        let b = a.reshape(&[2, 2]);
        assert_eq!(b.shape(), &[2, 2]);
        assert_eq!(b.rows(), 2);
        assert_eq!(b.row_len(), 2);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    #[should_panic(expected = "Cannot reshape")]
    fn test_reshape_wrong_size() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        let _ = a.reshape(&[2, 2]);
    }

    #[test]
    fn test_detach_is_new_node() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let d = a.detach();
        assert_ne!(a.id(), d.id());
        assert!(!d.requires_grad());
        d.data_mut()[0] = 9.0;
        assert_eq!(a.data()[0], 1.0);
    }

    #[test]
    fn test_grad_accumulate_and_zero() {
        let t = Tensor::zeros(2, true);
        t.accumulate_grad(arr1(&[1.0, 2.0]));
        t.accumulate_grad(arr1(&[1.0, 2.0]));
        assert_eq!(t.grad().unwrap().to_vec(), vec![2.0, 4.0]);
        t.zero_grad();
        assert!(t.grad().is_none());
    }

    #[test]
    fn test_full_and_item() {
        let t = Tensor::full(&[2, 3], 0.5, false);
        assert_eq!(t.len(), 6);
        assert_eq!(t.item(), 0.5);
    }
}

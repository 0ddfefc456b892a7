//! Backward operation trait and graph traversal

use super::Tensor;
use std::collections::HashSet;

/// Gradient rule attached to the result of a differentiable operation
///
/// `backward` reads the result gradient (captured at construction through
/// [`Tensor::grad_cell`]) and accumulates the input gradients. It must not
/// recurse into the inputs; traversal order is owned by [`topological_order`].
pub trait BackwardOp {
    /// Propagate the result gradient into the inputs
    fn backward(&self);

    /// Inputs of the operation, for graph traversal
    fn inputs(&self) -> Vec<Tensor>;
}

/// Nodes reachable from `root`, inputs before the nodes consuming them
///
/// Each node appears once even when it feeds several consumers, so a shared
/// input (one layer input fanning out to every candidate operation) is
/// back-propagated exactly once, after all its consumers have contributed.
pub fn topological_order(root: &Tensor) -> Vec<Tensor> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }
        let op = node.backward_op();
        stack.push((node, true));
        if let Some(op) = op {
            for input in op.inputs() {
                if !visited.contains(&input.id()) {
                    stack.push((input, false));
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{add, scale};

    #[test]
    fn test_order_visits_shared_input_once() {
        let x = Tensor::from_vec(vec![1.0], true);
        let a = scale(&x, 2.0);
        let b = scale(&x, 3.0);
        let y = add(&a, &b);

        let order = topological_order(&y);
        assert_eq!(order.len(), 4);
        assert_eq!(order.iter().filter(|t| t.id() == x.id()).count(), 1);
        assert_eq!(order.first().map(Tensor::id), Some(x.id()));
        assert_eq!(order.last().map(Tensor::id), Some(y.id()));
    }
}

//! Reverse-mode differentiation over the graph reachable from a root.
//! See https://rufflewind.com/2016-12-30/reverse-mode-automatic-differentiation

use std::collections::{HashMap, HashSet};

use crate::Value;

impl Value {
    /// Every node reachable from `self`, each exactly once, operands before the nodes that use
    /// them. `self` is always last.
    pub fn topological_order(&self) -> Vec<Value> {
        let mut order = vec![];
        let mut entered = HashSet::new();
        // (node, children already pushed)
        let mut stack = vec![(self.clone(), false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            if !entered.insert(node.id()) {
                continue;
            }
            stack.push((node.clone(), true));
            for child in node.children().rev() {
                if !entered.contains(&child.id()) {
                    stack.push((child.clone(), false));
                }
            }
        }
        order
    }

    /// Adds the derivative of `self` with respect to every reachable node into that node's
    /// [`grad`](Value::grad), with `self` seeded at 1.
    ///
    /// Gradients accumulate across calls: nothing is zeroed first, so calling this twice on the
    /// same root doubles every gradient. Call [`zero_grad`](Value::zero_grad) before to start
    /// fresh.
    pub fn backward(&self) {
        let order = self.topological_order();
        let index = index_of(&order);
        log::debug!("backward from {}: {} nodes", self.label(), order.len());

        // Gradients of this run only, committed to the nodes at the end.
        let mut grads = vec![0.; order.len()];
        if let Some(root) = grads.last_mut() {
            *root = 1.;
        }

        // Every consumer of a node comes later in `order`, so its gradient is complete by the
        // time the reverse walk reaches it.
        for (i, node) in order.iter().enumerate().rev() {
            let grad = grads[i];
            node.op().for_each_partial(node.data(), |child, d| {
                if let Some(&j) = index.get(&child.id()) {
                    grads[j] += d * grad;
                }
            });
        }

        for (node, grad) in order.iter().zip(grads) {
            log::trace!("{}: grad += {grad}", node.label());
            node.accumulate_grad(grad);
        }
    }

    /// Resets the gradient of every node reachable from `self` to zero.
    pub fn zero_grad(&self) {
        for node in self.topological_order() {
            node.clear_grad();
        }
    }

    /// One-time derivation of `self` with respect to `wrt` by a forward tangent sweep.
    /// Does not update internal gradient values. Returns 0 if `wrt` does not reach `self`.
    pub fn derive(&self, wrt: &Value) -> f64 {
        let order = self.topological_order();
        let index = index_of(&order);
        let mut tangents = vec![0.; order.len()];
        for (i, node) in order.iter().enumerate() {
            if node == wrt {
                tangents[i] = 1.;
                continue;
            }
            let mut tangent = 0.;
            node.op().for_each_partial(node.data(), |child, d| {
                if let Some(&j) = index.get(&child.id()) {
                    tangent += d * tangents[j];
                }
            });
            tangents[i] = tangent;
        }
        tangents.last().copied().unwrap_or(0.)
    }
}

fn index_of(order: &[Value]) -> HashMap<usize, usize> {
    order
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id(), i))
        .collect()
}

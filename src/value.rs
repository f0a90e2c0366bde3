use std::{
    borrow::Cow,
    cell::Cell,
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use crate::op::Op;

pub(crate) struct Node {
    name: String,
    op: Op,
    data: f64,
    grad: Cell<f64>,
}

impl Drop for Node {
    // Unlink operands iteratively; a long chain would otherwise be freed recursively.
    fn drop(&mut self) {
        let mut pending: Vec<Value> = std::mem::replace(&mut self.op, Op::Leaf)
            .into_operands()
            .collect();
        while let Some(value) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(value.0) {
                pending.extend(std::mem::replace(&mut node.op, Op::Leaf).into_operands());
            }
        }
    }
}

/// A scalar in the computation graph.
///
/// `Value` is a cheap handle to a shared node; cloning it does not copy the node, so the same
/// value can be an operand of many others. Equality and hashing follow node identity, not the
/// numeric value: two leaves holding `1.0` are different nodes.
///
/// The forward value is computed when the node is built and never changes. The gradient starts
/// at zero and is only written by [`Value::backward`] and [`Value::zero_grad`].
#[derive(Clone)]
pub struct Value(Rc<Node>);

impl Value {
    /// A leaf holding `data`.
    pub fn new(data: f64) -> Self {
        Self::named("", data)
    }

    /// A leaf with a name, shown in [`Value::dot`] output and in `expr_name` labels.
    pub fn named(name: impl Into<String>, data: f64) -> Self {
        Self(Rc::new(Node {
            name: name.into(),
            op: Op::Leaf,
            data,
            grad: Cell::new(0.),
        }))
    }

    pub(crate) fn from_op(data: f64, op: Op) -> Self {
        #[cfg(feature = "expr_name")]
        let name = op.expr_name();
        #[cfg(not(feature = "expr_name"))]
        let name = String::new();
        Self(Rc::new(Node {
            name,
            op,
            data,
            grad: Cell::new(0.),
        }))
    }

    pub fn data(&self) -> f64 {
        self.0.data
    }

    pub fn grad(&self) -> f64 {
        self.0.grad.get()
    }

    pub(crate) fn accumulate_grad(&self, grad: f64) {
        self.0.grad.set(self.0.grad.get() + grad);
    }

    pub(crate) fn clear_grad(&self) {
        self.0.grad.set(0.);
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The name if there is one, otherwise the value for leaves and the op tag for the rest.
    pub fn label(&self) -> Cow<'_, str> {
        if !self.0.name.is_empty() {
            Cow::Borrowed(&self.0.name)
        } else if self.is_leaf() {
            Cow::Owned(self.0.data.to_string())
        } else {
            Cow::Borrowed(self.op_tag())
        }
    }

    /// Which primitive produced this node, `"leaf"` for leaves.
    pub fn op_tag(&self) -> &'static str {
        self.0.op.tag()
    }

    pub(crate) fn op(&self) -> &Op {
        &self.0.op
    }

    /// The operands this node was computed from. An operand used twice is yielded twice.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &Value> + '_ {
        self.0.op.operands()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0.op, Op::Leaf)
    }

    /// Identity of the underlying node, stable for as long as any handle to it is alive.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl From<f64> for Value {
    fn from(data: f64) -> Self {
        Self::new(data)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("label", &self.label())
            .field("op", &self.op_tag())
            .field("data", &self.data())
            .field("grad", &self.grad())
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn leaf() {
        let a = Value::new(2.5);
        assert_eq!(a.data(), 2.5);
        assert_eq!(a.grad(), 0.);
        assert_eq!(a.op_tag(), "leaf");
        assert!(a.is_leaf());
        assert_eq!(a.children().count(), 0);
        assert_eq!(a.label(), "2.5");
    }

    #[test]
    fn identity_not_value() {
        let a = Value::new(1.);
        let b = Value::new(1.);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<Value> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn named_label() {
        let x = Value::named("x", -4.);
        assert_eq!(x.name(), "x");
        assert_eq!(x.label(), "x");
        assert_eq!(format!("{x}"), "-4");
    }

    #[cfg(feature = "expr_name")]
    #[test]
    fn expression_names() {
        let a = Value::named("a", 1.);
        let b = Value::named("b", 2.);
        let ab = &a + &b;
        assert_eq!(ab.name(), "(a + b)");
        assert_eq!((&ab * 3.).name(), "(a + b) * 3");
    }

    #[cfg(not(feature = "expr_name"))]
    #[test]
    fn internal_nodes_fall_back_to_op_tag() {
        let a = Value::new(1.);
        let r = a.relu();
        assert_eq!(r.name(), "");
        assert_eq!(r.label(), "relu");
    }
}

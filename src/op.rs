use crate::Value;

/// How a node was produced. Internal nodes keep handles to their operands here, which is also
/// where the local gradient rule is dispatched from.
#[derive(Clone, Debug)]
pub(crate) enum Op {
    Leaf,
    Add(Value, Value),
    Mul(Value, Value),
    /// The exponent is always a literal.
    Pow(Value, f64),
    Relu(Value),
    Exp(Value),
    Tanh(Value),
}

impl Op {
    pub(crate) fn tag(&self) -> &'static str {
        use Op::*;
        match self {
            Leaf => "leaf",
            Add(..) => "+",
            Mul(..) => "*",
            Pow(..) => "**",
            Relu(_) => "relu",
            Exp(_) => "exp",
            Tanh(_) => "tanh",
        }
    }

    pub(crate) fn operands(&self) -> impl DoubleEndedIterator<Item = &Value> + '_ {
        use Op::*;
        let (first, second) = match self {
            Leaf => (None, None),
            Add(lhs, rhs) | Mul(lhs, rhs) => (Some(lhs), Some(rhs)),
            Pow(term, _) | Relu(term) | Exp(term) | Tanh(term) => (Some(term), None),
        };
        first.into_iter().chain(second)
    }

    pub(crate) fn into_operands(self) -> impl Iterator<Item = Value> {
        use Op::*;
        let (first, second) = match self {
            Leaf => (None, None),
            Add(lhs, rhs) | Mul(lhs, rhs) => (Some(lhs), Some(rhs)),
            Pow(term, _) | Relu(term) | Exp(term) | Tanh(term) => (Some(term), None),
        };
        first.into_iter().chain(second)
    }

    /// Calls `f` with each operand and the partial derivative of the output with respect to it,
    /// evaluated at the operands' current values. `out` is the output's forward value.
    pub(crate) fn for_each_partial(&self, out: f64, mut f: impl FnMut(&Value, f64)) {
        use Op::*;
        match self {
            Leaf => (),
            Add(lhs, rhs) => {
                f(lhs, 1.);
                f(rhs, 1.);
            }
            Mul(lhs, rhs) => {
                f(lhs, rhs.data());
                f(rhs, lhs.data());
            }
            Pow(term, exp) => {
                // x^0 is constant; avoid 0 * 0^-1.
                let d = if *exp == 0. {
                    0.
                } else {
                    exp * term.data().powf(exp - 1.)
                };
                f(term, d);
            }
            // Zero at the kink.
            Relu(term) => f(term, if term.data() > 0. { 1. } else { 0. }),
            Exp(term) => f(term, out),
            Tanh(term) => f(term, 1. - out * out),
        }
    }

    #[cfg(feature = "expr_name")]
    pub(crate) fn expr_name(&self) -> String {
        use Op::*;
        match self {
            Leaf => String::new(),
            Add(lhs, rhs) => format!("({} + {})", lhs.label(), rhs.label()),
            Mul(lhs, rhs) => format!("{} * {}", lhs.label(), rhs.label()),
            Pow(term, exp) => format!("{}^{}", term.label(), exp),
            Relu(term) => format!("relu({})", term.label()),
            Exp(term) => format!("exp({})", term.label()),
            Tanh(term) => format!("tanh({})", term.label()),
        }
    }
}

/// Either side of a binary operator: an existing node or a plain number.
///
/// Literals are wrapped in a fresh leaf before the operator runs, so `2. * &x` and `&x * 2.`
/// build the same shape of graph.
#[derive(Clone, Debug)]
pub enum Operand {
    Node(Value),
    Literal(f64),
}

impl Operand {
    pub fn into_value(self) -> Value {
        match self {
            Self::Node(value) => value,
            Self::Literal(data) => Value::new(data),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Node(value)
    }
}

impl From<&Value> for Operand {
    fn from(value: &Value) -> Self {
        Self::Node(value.clone())
    }
}

impl From<f64> for Operand {
    fn from(data: f64) -> Self {
        Self::Literal(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partials(op: &Op, out: f64) -> Vec<f64> {
        let mut res = vec![];
        op.for_each_partial(out, |_, d| res.push(d));
        res
    }

    #[test]
    fn literal_becomes_fresh_leaf() {
        let a = Operand::from(3.).into_value();
        let b = Operand::from(3.).into_value();
        assert!(a.is_leaf());
        assert_ne!(a, b);

        let x = Value::new(1.);
        assert_eq!(Operand::from(&x).into_value(), x);
    }

    #[test]
    fn operands_keep_duplicates() {
        let a = Value::new(2.);
        let op = Op::Add(a.clone(), a.clone());
        assert_eq!(op.operands().count(), 2);
        assert!(op.operands().all(|v| *v == a));
        assert_eq!(Op::Leaf.operands().count(), 0);
    }

    #[test]
    fn local_rules() {
        let a = Value::new(3.);
        let b = Value::new(-2.);
        assert_eq!(partials(&Op::Add(a.clone(), b.clone()), 1.), vec![1., 1.]);
        assert_eq!(partials(&Op::Mul(a.clone(), b.clone()), -6.), vec![-2., 3.]);
        assert_eq!(partials(&Op::Pow(a.clone(), 2.), 9.), vec![6.]);
        assert_eq!(partials(&Op::Pow(a.clone(), 0.), 1.), vec![0.]);
        assert_eq!(partials(&Op::Relu(b.clone()), 0.), vec![0.]);
        assert_eq!(partials(&Op::Relu(a), 3.), vec![1.]);
        assert_eq!(partials(&Op::Relu(Value::new(0.)), 0.), vec![0.]);
        assert!(partials(&Op::Leaf, 1.).is_empty());
    }
}

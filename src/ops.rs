//! Differentiable primitives.
//!
//! Each function builds a new node from its operands; nothing existing is modified. The
//! arithmetic operators on [`Value`] delegate here, so `&a + 2.`, `2. + &a` and
//! `add(&a, 2.)` all build the same graph. Division is the one operator that can fail, so
//! `/` evaluates to a [`Result`].

use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign},
};

use crate::{
    error::{EngineError, Result},
    op::{Op, Operand},
    Value,
};

pub fn add(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Value {
    let (lhs, rhs) = (lhs.into().into_value(), rhs.into().into_value());
    Value::from_op(lhs.data() + rhs.data(), Op::Add(lhs, rhs))
}

pub fn mul(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Value {
    let (lhs, rhs) = (lhs.into().into_value(), rhs.into().into_value());
    Value::from_op(lhs.data() * rhs.data(), Op::Mul(lhs, rhs))
}

/// `base` raised to a literal `exponent`.
///
/// A node exponent is rejected with [`EngineError::UnsupportedOperand`]. A negative exponent on
/// a base that is exactly zero is rejected with [`EngineError::DivisionByZero`].
pub fn pow(base: impl Into<Operand>, exponent: impl Into<Operand>) -> Result<Value> {
    let exp = match exponent.into() {
        Operand::Literal(exp) => exp,
        Operand::Node(node) => {
            log::trace!("pow: rejected node exponent {node:?}");
            return Err(EngineError::UnsupportedOperand {
                op: "pow",
                operand: format!("node exponent ({})", node.label()),
            });
        }
    };
    let base = base.into().into_value();
    if exp < 0. && base.data() == 0. {
        return Err(EngineError::DivisionByZero { op: "pow" });
    }
    Ok(Value::from_op(base.data().powf(exp), Op::Pow(base, exp)))
}

/// `-term`, built as `term * -1`.
pub fn neg(term: impl Into<Operand>) -> Value {
    mul(term, -1.)
}

/// `lhs - rhs`, built as `lhs + (-rhs)`.
pub fn sub(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Value {
    add(lhs, neg(rhs))
}

/// `lhs / rhs`, built as `lhs * rhs^-1`. Fails if `rhs` is exactly zero.
pub fn truediv(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Result<Value> {
    let recip = match pow(rhs, -1.) {
        Err(EngineError::DivisionByZero { .. }) => {
            log::trace!("truediv: zero divisor");
            return Err(EngineError::DivisionByZero { op: "truediv" });
        }
        res => res?,
    };
    Ok(mul(lhs, recip))
}

pub fn relu(term: impl Into<Operand>) -> Value {
    let term = term.into().into_value();
    Value::from_op(term.data().max(0.), Op::Relu(term))
}

pub fn exp(term: impl Into<Operand>) -> Value {
    let term = term.into().into_value();
    Value::from_op(term.data().exp(), Op::Exp(term))
}

pub fn tanh(term: impl Into<Operand>) -> Value {
    let term = term.into().into_value();
    Value::from_op(term.data().tanh(), Op::Tanh(term))
}

// Method forms of the primitives, usable without importing the `std::ops` traits.
#[allow(clippy::should_implement_trait)]
impl Value {
    pub fn add(&self, rhs: impl Into<Operand>) -> Value {
        add(self, rhs)
    }

    pub fn mul(&self, rhs: impl Into<Operand>) -> Value {
        mul(self, rhs)
    }

    pub fn sub(&self, rhs: impl Into<Operand>) -> Value {
        sub(self, rhs)
    }

    /// Same as `self / rhs`.
    pub fn div(&self, rhs: impl Into<Operand>) -> Result<Value> {
        truediv(self, rhs)
    }

    pub fn neg(&self) -> Value {
        neg(self)
    }

    pub fn pow(&self, exponent: impl Into<Operand>) -> Result<Value> {
        pow(self, exponent)
    }

    pub fn relu(&self) -> Value {
        relu(self)
    }

    pub fn exp(&self) -> Value {
        exp(self)
    }

    pub fn tanh(&self) -> Value {
        tanh(self)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $prim:ident, $output:ty) => {
        impl<T: Into<Operand>> $trait<T> for &Value {
            type Output = $output;
            fn $method(self, rhs: T) -> Self::Output {
                $prim(self, rhs)
            }
        }

        impl<T: Into<Operand>> $trait<T> for Value {
            type Output = $output;
            fn $method(self, rhs: T) -> Self::Output {
                $prim(self, rhs)
            }
        }

        impl $trait<&Value> for f64 {
            type Output = $output;
            fn $method(self, rhs: &Value) -> Self::Output {
                $prim(self, rhs)
            }
        }

        impl $trait<Value> for f64 {
            type Output = $output;
            fn $method(self, rhs: Value) -> Self::Output {
                $prim(self, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, add, Value);
impl_binary_op!(Sub, sub, sub, Value);
impl_binary_op!(Mul, mul, mul, Value);
impl_binary_op!(Div, div, truediv, Result<Value>);

impl Neg for &Value {
    type Output = Value;
    fn neg(self) -> Self::Output {
        neg(self)
    }
}

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Self::Output {
        neg(self)
    }
}

// `x += y` rebinds `x` to a new node; the node `x` held before is left untouched.
macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $prim:ident) => {
        impl<T: Into<Operand>> $trait<T> for Value {
            fn $method(&mut self, rhs: T) {
                *self = $prim(&*self, rhs);
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, add);
impl_assign_op!(SubAssign, sub_assign, sub);
impl_assign_op!(MulAssign, mul_assign, mul);

impl Sum for Value {
    /// Chains `+` nodes; an empty sum is a new `0.0` leaf.
    fn sum<I: Iterator<Item = Value>>(iter: I) -> Self {
        iter.reduce(|acc, v| add(acc, v)).unwrap_or_else(|| Value::new(0.))
    }
}

impl<'a> Sum<&'a Value> for Value {
    fn sum<I: Iterator<Item = &'a Value>>(iter: I) -> Self {
        iter.cloned().sum()
    }
}

//! A scalar-valued reverse-mode automatic differentiation engine.
//!
//! Build an expression out of [`Value`]s, call [`Value::backward`] on the result and read
//! [`Value::grad`] on any node that contributed to it.
//!
//! ```
//! use scalargrad::Value;
//!
//! let a = Value::new(3.);
//! let b = &a + &a;
//! let c = &b * &a;
//! c.backward();
//! assert_eq!(c.data(), 18.);
//! assert_eq!(a.grad(), 12.);
//! ```

mod backprop;
mod dot;
pub mod error;
mod op;
pub mod ops;
mod value;

pub use error::{EngineError, Result};
pub use op::Operand;
pub use value::Value;

#[cfg(feature = "macro")]
pub use scalargrad_macro::scalargrad;

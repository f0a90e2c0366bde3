use thiserror::Error;

/// Errors raised while building a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The operator does not accept this kind of operand, e.g. a node as the exponent of `pow`.
    #[error("Unsupported operand for `{op}`: {operand}")]
    UnsupportedOperand { op: &'static str, operand: String },

    /// A node whose value is exactly zero was used as a divisor.
    #[error("Division by zero in `{op}`")]
    DivisionByZero { op: &'static str },
}

pub type Result<T> = std::result::Result<T, EngineError>;

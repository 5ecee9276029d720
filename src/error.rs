use thiserror::Error;

use crate::op::OperatorKind;

/// The complex arithmetic has no defined result for the given operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("logarithm of zero")]
    LogOfZero,
    #[error("zero raised to a negative or complex power")]
    ZeroToNegativePower,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A reachable variable has no entry in the bindings.
    #[error("variable `{0}` is not bound")]
    UnboundVariable(String),

    #[error("`{kind}` takes {expected} operand(s), got {got}")]
    Arity {
        kind: OperatorKind,
        expected: usize,
        got: usize,
    },

    #[error("`{kind}` has {arity} operand(s), no operand {index}")]
    OperandIndex {
        kind: OperatorKind,
        index: usize,
        arity: usize,
    },

    /// `backward` reached an operation that has no forward result in the session.
    #[error("`{node}` has no value from the forward pass. Call `forward()` before `backward()`.")]
    StaleState { node: String },

    #[error("`{kind}` is undefined: {source}")]
    Domain {
        kind: OperatorKind,
        #[source]
        source: DomainError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

//! The operator table: every operator kind bound to its evaluation function and
//! one partial derivative per operand.

use std::fmt::Display;

use num_complex::Complex64;

use crate::{
    complex::{self, ONE},
    error::{self, DomainError, Error},
};

/// A function of the operand values, in operand order.
pub(crate) type OpFn = fn(&[Complex64]) -> Result<Complex64, DomainError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Sin,
    Cos,
    Exp,
    Log,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

pub(crate) struct OpEntry {
    pub name: &'static str,
    /// Infix symbol for binary operators.
    pub symbol: Option<&'static str>,
    pub eval: OpFn,
    pub partials: &'static [OpFn],
}

impl OpEntry {
    fn arity(&self) -> usize {
        self.partials.len()
    }
}

fn sin(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0].sin())
}

fn cos(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0].cos())
}

fn neg_sin(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(-v[0].sin())
}

fn exp(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0].exp())
}

fn log(v: &[Complex64]) -> Result<Complex64, DomainError> {
    complex::log(v[0])
}

fn recip(v: &[Complex64]) -> Result<Complex64, DomainError> {
    complex::div(ONE, v[0])
}

fn add(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0] + v[1])
}

fn sub(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0] - v[1])
}

fn mul(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0] * v[1])
}

fn div(v: &[Complex64]) -> Result<Complex64, DomainError> {
    complex::div(v[0], v[1])
}

fn pow(v: &[Complex64]) -> Result<Complex64, DomainError> {
    complex::pow(v[0], v[1])
}

fn one(_: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(ONE)
}

fn minus_one(_: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(-ONE)
}

fn lhs(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[0])
}

fn rhs(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[1])
}

fn recip_rhs(v: &[Complex64]) -> Result<Complex64, DomainError> {
    complex::div(ONE, v[1])
}

/// d(x / y)/dy = -x / y^2
fn div_grad_rhs(v: &[Complex64]) -> Result<Complex64, DomainError> {
    complex::div(-v[0], complex::pow(v[1], Complex64::new(2., 0.))?)
}

/// d(x ^ y)/dx = y * x^(y - 1)
fn pow_grad_lhs(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(v[1] * complex::pow(v[0], v[1] - ONE)?)
}

/// d(x ^ y)/dy = log(x) * x^y
fn pow_grad_rhs(v: &[Complex64]) -> Result<Complex64, DomainError> {
    Ok(complex::log(v[0])? * complex::pow(v[0], v[1])?)
}

static TABLE: [OpEntry; 9] = [
    OpEntry {
        name: "sin",
        symbol: None,
        eval: sin,
        partials: &[cos],
    },
    OpEntry {
        name: "cos",
        symbol: None,
        eval: cos,
        partials: &[neg_sin],
    },
    OpEntry {
        name: "exp",
        symbol: None,
        eval: exp,
        partials: &[exp],
    },
    OpEntry {
        name: "log",
        symbol: None,
        eval: log,
        partials: &[recip],
    },
    OpEntry {
        name: "add",
        symbol: Some("+"),
        eval: add,
        partials: &[one, one],
    },
    OpEntry {
        name: "sub",
        symbol: Some("-"),
        eval: sub,
        partials: &[one, minus_one],
    },
    OpEntry {
        name: "mul",
        symbol: Some("*"),
        eval: mul,
        partials: &[rhs, lhs],
    },
    OpEntry {
        name: "div",
        symbol: Some("/"),
        eval: div,
        partials: &[recip_rhs, div_grad_rhs],
    },
    OpEntry {
        name: "pow",
        symbol: Some("^"),
        eval: pow,
        partials: &[pow_grad_lhs, pow_grad_rhs],
    },
];

impl OperatorKind {
    pub const ALL: [OperatorKind; 9] = [
        Self::Sin,
        Self::Cos,
        Self::Exp,
        Self::Log,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Pow,
    ];

    pub(crate) fn entry(self) -> &'static OpEntry {
        &TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub(crate) fn symbol(self) -> Option<&'static str> {
        self.entry().symbol
    }

    pub fn arity(self) -> usize {
        self.entry().arity()
    }

    fn check_args(self, args: &[Complex64]) -> error::Result<()> {
        if args.len() != self.arity() {
            return Err(Error::Arity {
                kind: self,
                expected: self.arity(),
                got: args.len(),
            });
        }
        Ok(())
    }

    fn domain(self, source: DomainError) -> Error {
        Error::Domain { kind: self, source }
    }

    /// Evaluate the operator on operand values, one per operand.
    pub fn eval(self, args: &[Complex64]) -> error::Result<Complex64> {
        self.check_args(args)?;
        (self.entry().eval)(args).map_err(|e| self.domain(e))
    }

    /// Partial derivative with respect to operand `i`, at the same operand values `eval` sees.
    pub fn partial(self, i: usize, args: &[Complex64]) -> error::Result<Complex64> {
        self.check_args(args)?;
        let partial = self.entry().partials.get(i).ok_or(Error::OperandIndex {
            kind: self,
            index: i,
            arity: self.arity(),
        })?;
        partial(args).map_err(|e| self.domain(e))
    }
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

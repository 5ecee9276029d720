//! Reverse-mode automatic differentiation of complex-valued expressions.
//!
//! Build an expression graph from [`Node`]s, then [`evaluate`] it to get its
//! value together with its partial derivative with respect to every variable.
//!
//! ```
//! use adjoint::{evaluate, Bindings, Complex64, Node};
//!
//! let x = Node::variable("x");
//! let y = Node::variable("y");
//! let f = &(&x * &y) + &x.sin();
//!
//! let bindings = Bindings::from([
//!     ("x".to_string(), Complex64::new(0., 0.)),
//!     ("y".to_string(), Complex64::new(2., 0.)),
//! ]);
//! let result = evaluate(&f, &bindings).unwrap();
//! assert_eq!(result.value, Complex64::new(0., 0.));
//! assert_eq!(result.derivative("x"), Some(Complex64::new(3., 0.)));
//! assert_eq!(result.derivative("y"), Some(Complex64::new(0., 0.)));
//! ```

pub mod complex;
pub mod error;
mod node;
mod op;
mod session;

pub use error::{DomainError, Error, Result};
pub use node::{add, cos, div, exp, log, mul, pow, sin, sub, Node};
pub use num_complex::Complex64;
pub use op::OperatorKind;
pub use session::{evaluate, Bindings, Derivatives, Evaluation, Session};

#[cfg(feature = "macro")]
pub use adjoint_macro::adjoint;

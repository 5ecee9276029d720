//! Reverse-mode evaluation: one forward sweep caching operand values, then one
//! backward sweep propagating the adjoint from the root to every variable.
//! See https://rufflewind.com/2016-12-30/reverse-mode-automatic-differentiation

use std::collections::{HashMap, HashSet};

use num_complex::Complex64;

use crate::{
    complex::{ONE, ZERO},
    error::{Error, Result},
    node::{Node, NodeId, NodeInt},
};

/// Values of the free variables, by name.
pub type Bindings = HashMap<String, Complex64>;

/// Accumulated partial derivatives of the root, by variable name.
pub type Derivatives = HashMap<String, Complex64>;

/// Result of [`evaluate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub value: Complex64,
    pub derivatives: Derivatives,
}

impl Evaluation {
    pub fn derivative(&self, name: &str) -> Option<Complex64> {
        self.derivatives.get(name).copied()
    }
}

/// State of one evaluation: operand values cached by the forward pass and the
/// derivative accumulator filled by the backward pass.
///
/// Each cached operation is kept alive by the session, so a node identity
/// cannot be reused by another allocation while its values are cached.
#[derive(Default, Debug)]
pub struct Session {
    cache: HashMap<NodeId, (Node, Vec<Complex64>)>,
    derivatives: Derivatives,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `node`, replacing whatever an earlier forward pass cached and
    /// clearing the accumulated derivatives.
    pub fn forward(&mut self, node: &Node, bindings: &Bindings) -> Result<Complex64> {
        self.cache.clear();
        self.derivatives.clear();
        self.forward_rec(node, bindings)
    }

    fn forward_rec(&mut self, node: &Node, bindings: &Bindings) -> Result<Complex64> {
        match node.int() {
            NodeInt::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| Error::UnboundVariable(name.clone())),
            NodeInt::Constant(value) => Ok(*value),
            NodeInt::Operation { kind, operands } => {
                let values = match self.cache.get(&node.id()) {
                    Some((_, values)) => values.clone(),
                    None => {
                        let values = operands
                            .iter()
                            .map(|operand| self.forward_rec(operand, bindings))
                            .collect::<Result<Vec<_>>>()?;
                        tracing::trace!(node = %node, ?values, "cached operands");
                        self.cache.insert(node.id(), (node.clone(), values.clone()));
                        values
                    }
                };
                kind.eval(&values)
            }
        }
    }

    /// Propagate `multiplier`, the derivative of the root with respect to
    /// `node`, down to the variables below `node`.
    ///
    /// Adjoints are summed per node and pushed to the operands once, in
    /// topological order, so shared sub-expressions are visited once.
    pub fn backward(&mut self, node: &Node, multiplier: Complex64) -> Result<()> {
        let mut visited = HashSet::new();
        let mut order = vec![];
        topological_sort(node, &mut visited, &mut order);

        let mut adjoints = HashMap::from([(node.id(), multiplier)]);
        for node in order.iter().rev() {
            let adjoint = adjoints.get(&node.id()).copied().unwrap_or(ZERO);
            match node.int() {
                NodeInt::Variable(name) => {
                    let entry = self.derivatives.entry(name.clone()).or_insert(ZERO);
                    *entry += adjoint;
                    tracing::trace!(variable = %name, %adjoint, total = %entry, "accumulated");
                }
                NodeInt::Constant(_) => (),
                NodeInt::Operation { kind, operands } => {
                    let stale = || Error::StaleState {
                        node: node.to_string(),
                    };
                    let (_, values) = self.cache.get(&node.id()).ok_or_else(stale)?;
                    for (i, operand) in operands.iter().enumerate() {
                        let partial = kind.partial(i, values)?;
                        *adjoints.entry(operand.id()).or_insert(ZERO) += adjoint * partial;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn derivatives(&self) -> &Derivatives {
        &self.derivatives
    }

    pub fn into_derivatives(self) -> Derivatives {
        self.derivatives
    }
}

/// Post-order of the nodes reachable from `node`; every node comes after its operands.
fn topological_sort<'a>(
    node: &'a Node,
    visited: &mut HashSet<NodeId>,
    order: &mut Vec<&'a Node>,
) {
    if !visited.insert(node.id()) {
        return;
    }
    for operand in node.operands() {
        topological_sort(operand, visited, order);
    }
    order.push(node);
}

/// Evaluate `root` at `bindings` and differentiate it with respect to every
/// variable it reaches.
///
/// Each call runs in a fresh [`Session`], so the graph can be evaluated
/// repeatedly, or from several threads at once.
pub fn evaluate(root: &Node, bindings: &Bindings) -> Result<Evaluation> {
    tracing::debug!(root = %root, "forward pass");
    let mut session = Session::new();
    let value = session.forward(root, bindings)?;
    session.backward(root, ONE)?;
    let derivatives = session.into_derivatives();
    tracing::debug!(%value, variables = derivatives.len(), "backward pass done");
    Ok(Evaluation { value, derivatives })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.)
    }

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), c(*value)))
            .collect()
    }

    #[test]
    fn backward_before_forward_is_stale() {
        let x = Node::variable("x");
        let f = x.sin();
        let mut session = Session::new();
        assert_eq!(
            session.backward(&f, ONE),
            Err(Error::StaleState {
                node: "sin(x)".to_string()
            })
        );
    }

    #[test]
    fn forward_in_another_session_does_not_count() {
        let x = Node::variable("x");
        let f = x.exp();
        let mut first = Session::new();
        first.forward(&f, &bindings(&[("x", 0.)])).unwrap();
        let mut second = Session::new();
        assert!(matches!(second.backward(&f, ONE), Err(Error::StaleState { .. })));
        first.backward(&f, ONE).unwrap();
        assert_eq!(first.derivatives().get("x"), Some(&c(1.)));
    }

    #[test]
    fn forward_starts_a_fresh_sweep() {
        let x = Node::variable("x");
        let f = x.exp();
        let mut session = Session::new();
        assert_eq!(session.forward(&f, &bindings(&[("x", 0.)])), Ok(c(1.)));
        session.backward(&f, ONE).unwrap();
        assert_eq!(session.derivatives().get("x"), Some(&c(1.)));

        let e = c(std::f64::consts::E);
        let value = session.forward(&f, &bindings(&[("x", 1.)])).unwrap();
        assert!((value - e).norm() < 1e-15);
        assert!(session.derivatives().is_empty());
        session.backward(&f, ONE).unwrap();
        assert!((session.derivatives()["x"] - e).norm() < 1e-15);
    }

    #[test]
    fn forward_of_another_root_replaces_the_cache() {
        let x = Node::variable("x");
        let f = x.exp();
        let g = x.sin();
        let mut session = Session::new();
        session.forward(&f, &bindings(&[("x", 0.)])).unwrap();
        session.forward(&g, &bindings(&[("x", 0.)])).unwrap();
        assert!(matches!(session.backward(&f, ONE), Err(Error::StaleState { .. })));
        session.backward(&g, ONE).unwrap();
    }

    #[test]
    fn dropped_graph_does_not_satisfy_a_new_one() {
        let mut session = Session::new();
        let f = Node::variable("x").exp();
        session.forward(&f, &bindings(&[("x", 0.)])).unwrap();
        drop(f);
        for _ in 0..100 {
            let g = Node::variable("x").exp();
            assert!(matches!(session.backward(&g, ONE), Err(Error::StaleState { .. })));
        }
    }

    #[test]
    fn nested_diamonds_are_visited_once() {
        let x = Node::variable("x");
        let mut f = x.clone();
        for _ in 0..64 {
            f = &f + &f;
        }
        let result = evaluate(&f, &bindings(&[("x", 1.)])).unwrap();
        let expected = c(2f64.powi(64));
        assert_eq!(result.value, expected);
        assert_eq!(result.derivatives, Derivatives::from([("x".to_string(), expected)]));
    }

    #[test]
    fn leaves_need_no_forward() {
        let x = Node::variable("x");
        let mut session = Session::new();
        session.backward(&x, c(2.)).unwrap();
        session.backward(&x, c(3.)).unwrap();
        session.backward(&Node::real(7.), c(3.)).unwrap();
        assert_eq!(session.into_derivatives(), bindings(&[("x", 5.)]));
    }

    #[test]
    fn shared_operation_is_cached_once() {
        let x = Node::variable("x");
        let shared = x.exp();
        let f = &shared * &shared;
        let mut session = Session::new();
        let value = session.forward(&f, &bindings(&[("x", 0.)])).unwrap();
        assert_eq!(value, c(1.));
        assert_eq!(session.cache.len(), 2);
        session.backward(&f, ONE).unwrap();
        // d/dx exp(x)^2 = 2 exp(2x)
        assert_eq!(session.derivatives().get("x"), Some(&c(2.)));
    }

    #[test]
    fn unreferenced_bindings_are_ignored() {
        let x = Node::variable("x");
        let f = &x * 3.;
        let result = evaluate(&f, &bindings(&[("x", 2.), ("unused", 1.)])).unwrap();
        assert_eq!(result.value, c(6.));
        assert_eq!(result.derivatives, bindings(&[("x", 3.)]));
        assert_eq!(result.derivative("unused"), None);
    }

    #[test]
    fn zero_derivatives_are_kept() {
        let x = Node::variable("x");
        let f = &x - &x;
        let result = evaluate(&f, &bindings(&[("x", 4.)])).unwrap();
        assert_eq!(result.derivative("x"), Some(c(0.)));
    }

    #[test]
    fn domain_errors_carry_the_operator() {
        let x = Node::variable("x");
        let f = &Node::real(1.) / &x;
        assert!(matches!(
            evaluate(&f, &bindings(&[("x", 0.)])),
            Err(Error::Domain {
                kind: crate::OperatorKind::Div,
                source: crate::DomainError::DivisionByZero,
            })
        ));
    }

    #[test]
    fn domain_error_in_backward_pass() {
        // 0^2 is defined but its derivative in the exponent needs log(0).
        let x = Node::variable("x");
        let f = x.pow(&Node::real(2.));
        let mut session = Session::new();
        assert_eq!(session.forward(&f, &bindings(&[("x", 0.)])), Ok(c(0.)));
        assert!(matches!(
            session.backward(&f, ONE),
            Err(Error::Domain {
                source: crate::DomainError::LogOfZero,
                ..
            })
        ));
    }
}

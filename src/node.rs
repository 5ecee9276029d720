use std::{
    collections::BTreeSet,
    fmt::Display,
    ops::{Add, Div, Mul, Sub},
    sync::Arc,
};

use num_complex::Complex64;

use crate::{
    error::{Error, Result},
    op::OperatorKind,
};

#[derive(Debug)]
pub(crate) enum NodeInt {
    Variable(String),
    Constant(Complex64),
    Operation {
        kind: OperatorKind,
        operands: Vec<Node>,
    },
}

/// A node of an immutable expression graph.
///
/// Cloning a `Node` clones the handle, not the expression, so the same
/// sub-expression can feed any number of parents.
#[derive(Clone, Debug)]
pub struct Node(Arc<NodeInt>);

/// Identity of a node within one graph. Only meaningful while the node is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl Node {
    pub fn variable(name: impl Into<String>) -> Node {
        Self::new_int(NodeInt::Variable(name.into()))
    }

    pub fn constant(value: Complex64) -> Node {
        Self::new_int(NodeInt::Constant(value))
    }

    /// A constant on the real axis.
    pub fn real(value: f64) -> Node {
        Self::constant(Complex64::new(value, 0.))
    }

    /// Build an operation from any number of operands, checking the count
    /// against the operator's arity.
    pub fn operation(kind: OperatorKind, operands: Vec<Node>) -> Result<Node> {
        if operands.len() != kind.arity() {
            return Err(Error::Arity {
                kind,
                expected: kind.arity(),
                got: operands.len(),
            });
        }
        Ok(Self::new_int(NodeInt::Operation { kind, operands }))
    }

    fn unary(kind: OperatorKind, operand: &Node) -> Node {
        Self::new_int(NodeInt::Operation {
            kind,
            operands: vec![operand.clone()],
        })
    }

    fn binary(kind: OperatorKind, lhs: &Node, rhs: &Node) -> Node {
        Self::new_int(NodeInt::Operation {
            kind,
            operands: vec![lhs.clone(), rhs.clone()],
        })
    }

    fn new_int(val: NodeInt) -> Self {
        Self(Arc::new(val))
    }

    pub(crate) fn int(&self) -> &NodeInt {
        &self.0
    }

    pub(crate) fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as usize)
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self.int() {
            NodeInt::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<Complex64> {
        match self.int() {
            NodeInt::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<OperatorKind> {
        match self.int() {
            NodeInt::Operation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Operands in order; empty for leaves.
    pub fn operands(&self) -> &[Node] {
        match self.int() {
            NodeInt::Operation { operands, .. } => operands,
            _ => &[],
        }
    }

    /// Names of all variables reachable from this node, sorted and de-duplicated.
    pub fn variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.accum_variables(&mut names);
        names.into_iter().collect()
    }

    fn accum_variables(&self, names: &mut BTreeSet<String>) {
        match self.int() {
            NodeInt::Variable(name) => {
                names.insert(name.clone());
            }
            NodeInt::Constant(_) => (),
            NodeInt::Operation { operands, .. } => {
                for operand in operands {
                    operand.accum_variables(names);
                }
            }
        }
    }

    pub fn sin(&self) -> Node {
        sin(self)
    }

    pub fn cos(&self) -> Node {
        cos(self)
    }

    pub fn exp(&self) -> Node {
        exp(self)
    }

    pub fn log(&self) -> Node {
        log(self)
    }

    pub fn pow(&self, exponent: &Node) -> Node {
        pow(self, exponent)
    }
}

pub fn sin(x: &Node) -> Node {
    Node::unary(OperatorKind::Sin, x)
}

pub fn cos(x: &Node) -> Node {
    Node::unary(OperatorKind::Cos, x)
}

pub fn exp(x: &Node) -> Node {
    Node::unary(OperatorKind::Exp, x)
}

/// Natural logarithm, principal branch.
pub fn log(x: &Node) -> Node {
    Node::unary(OperatorKind::Log, x)
}

pub fn add(lhs: &Node, rhs: &Node) -> Node {
    Node::binary(OperatorKind::Add, lhs, rhs)
}

pub fn sub(lhs: &Node, rhs: &Node) -> Node {
    Node::binary(OperatorKind::Sub, lhs, rhs)
}

pub fn mul(lhs: &Node, rhs: &Node) -> Node {
    Node::binary(OperatorKind::Mul, lhs, rhs)
}

pub fn div(lhs: &Node, rhs: &Node) -> Node {
    Node::binary(OperatorKind::Div, lhs, rhs)
}

pub fn pow(base: &Node, exponent: &Node) -> Node {
    Node::binary(OperatorKind::Pow, base, exponent)
}

impl From<Complex64> for Node {
    fn from(value: Complex64) -> Self {
        Node::constant(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::real(value)
    }
}

macro_rules! impl_binary_sugar {
    ($trait:ident, $method:ident, $builder:ident) => {
        impl $trait for &Node {
            type Output = Node;
            fn $method(self, rhs: Self) -> Self::Output {
                $builder(self, rhs)
            }
        }

        impl $trait for Node {
            type Output = Node;
            fn $method(self, rhs: Self) -> Self::Output {
                $builder(&self, &rhs)
            }
        }

        impl $trait<f64> for &Node {
            type Output = Node;
            fn $method(self, rhs: f64) -> Self::Output {
                $builder(self, &Node::real(rhs))
            }
        }

        impl $trait<f64> for Node {
            type Output = Node;
            fn $method(self, rhs: f64) -> Self::Output {
                $builder(&self, &Node::real(rhs))
            }
        }

        impl $trait<&Node> for f64 {
            type Output = Node;
            fn $method(self, rhs: &Node) -> Self::Output {
                $builder(&Node::real(self), rhs)
            }
        }

        impl $trait<Node> for f64 {
            type Output = Node;
            fn $method(self, rhs: Node) -> Self::Output {
                $builder(&Node::real(self), &rhs)
            }
        }
    };
}

impl_binary_sugar!(Add, add, add);
impl_binary_sugar!(Sub, sub, sub);
impl_binary_sugar!(Mul, mul, mul);
impl_binary_sugar!(Div, div, div);

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.int() {
            NodeInt::Variable(name) => write!(f, "{name}"),
            NodeInt::Constant(value) if value.im == 0. => write!(f, "{}", value.re),
            NodeInt::Constant(value) => write!(f, "({value})"),
            NodeInt::Operation { kind, operands } => match (kind.symbol(), &operands[..]) {
                (Some(symbol), [lhs, rhs]) => write!(f, "({lhs} {symbol} {rhs})"),
                _ => {
                    write!(f, "{kind}(")?;
                    for (i, operand) in operands.iter().enumerate() {
                        if i != 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{operand}")?;
                    }
                    write!(f, ")")
                }
            },
        }
    }
}

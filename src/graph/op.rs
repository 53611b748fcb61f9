//! Node types of a compute graph.
//!
//! An [`Op`] only refers to its inputs by [`OpId`]; the owning
//! [`Dag`](crate::graph::Dag) resolves ids. Ops are compared and hashed
//! structurally (kind + input ids + literal bits / variable name), which is
//! what lets the DAG share identical subexpressions.

use core::fmt;
use std::hash::{Hash, Hasher};

/// Index of a node inside its [`Dag`](crate::graph::Dag).
///
/// Ids are handed out in creation order, and a node is always created after
/// its inputs, so ascending id order is a topological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpId(pub(crate) u32);

impl OpId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_{}", self.0)
    }
}

/// Operators taking one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Exp,
    Log,
    Sin,
    Cos,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Exp => "exp",
            UnaryOp::Log => "log",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
        }
    }

    /// Applies the operator to a value.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Exp => x.exp(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
        }
    }

    /// Function name accepted by the expression parser.
    pub fn from_function_name(name: &str) -> Option<UnaryOp> {
        match name {
            "neg" => Some(UnaryOp::Neg),
            "exp" => Some(UnaryOp::Exp),
            "log" => Some(UnaryOp::Log),
            "sin" => Some(UnaryOp::Sin),
            "cos" => Some(UnaryOp::Cos),
            _ => None,
        }
    }
}

/// Operators taking two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }

    /// Applies the operator to two values.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }
}

/// A node (operation) in a compute graph.
#[derive(Debug, Clone)]
pub enum Op {
    /// Constant value. `-0.0` is stored as `0.0`.
    Lit(f64),
    /// Named free variable; its value is supplied at evaluation time.
    Var(String),
    Unary(UnaryOp, [OpId; 1]),
    Binary(BinaryOp, [OpId; 2]),
    /// Gradient holder produced by backpropagation.
    ///
    /// `inputs[0]` is the differentiated result, `inputs[i + 1]` its partial
    /// derivative with respect to `vars[i]`. Evaluates to `inputs[0]`.
    Grad { inputs: Vec<OpId>, vars: Vec<OpId> },
}

impl Op {
    /// Inputs of this node, in order.
    pub fn inputs(&self) -> &[OpId] {
        match self {
            Op::Lit(_) | Op::Var(_) => &[],
            Op::Unary(_, ins) => ins,
            Op::Binary(_, ins) => ins,
            Op::Grad { inputs, .. } => inputs,
        }
    }

    pub fn is_lit(&self, value: f64) -> bool {
        matches!(self, Op::Lit(v) if *v == value)
    }

    pub fn lit_value(&self) -> Option<f64> {
        match self {
            Op::Lit(v) => Some(*v),
            _ => None,
        }
    }

    /// Short operator string used in DOT labels.
    pub fn label(&self) -> String {
        match self {
            Op::Lit(v) => format_lit(*v),
            Op::Var(name) => name.clone(),
            Op::Unary(op, _) => op.name().to_owned(),
            Op::Binary(op, _) => op.symbol().to_owned(),
            Op::Grad { .. } => "grad".to_owned(),
        }
    }
}

/// Renders a literal the way the infix printer and DOT labels show it
/// (`1.0`, `0.5`, `1e20`).
pub fn format_lit(v: f64) -> String {
    format!("{:?}", v)
}

impl PartialEq for Op {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Bitwise so that the hash/eq contract holds for every value.
            (Op::Lit(a), Op::Lit(b)) => a.to_bits() == b.to_bits(),
            (Op::Var(a), Op::Var(b)) => a == b,
            (Op::Unary(o1, a), Op::Unary(o2, b)) => o1 == o2 && a == b,
            (Op::Binary(o1, a), Op::Binary(o2, b)) => o1 == o2 && a == b,
            (
                Op::Grad { inputs: i1, vars: v1 },
                Op::Grad { inputs: i2, vars: v2 },
            ) => i1 == i2 && v1 == v2,
            _ => false,
        }
    }
}

impl Eq for Op {}

impl Hash for Op {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Op::Lit(v) => v.to_bits().hash(state),
            Op::Var(name) => name.hash(state),
            Op::Unary(op, ins) => {
                op.hash(state);
                ins.hash(state);
            }
            Op::Binary(op, ins) => {
                op.hash(state);
                ins.hash(state);
            }
            Op::Grad { inputs, vars } => {
                inputs.hash(state);
                vars.hash(state);
            }
        }
    }
}

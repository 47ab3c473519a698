//! Operator registry and the per-node record of the postorder tree encoding.

use crate::Float;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;

/// Closed enumeration of operator kinds.
///
/// Declaration order is the stable dispatch index (see [`NodeKind::index`]);
/// new kinds may only be appended, never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// N-ary addition.
    Add,
    /// N-ary multiplication.
    Mul,
    /// N-ary subtraction, folded as `a - (b + c + ...)`.
    Sub,
    /// N-ary division, folded as `a / (b * c * ...)`.
    Div,
    /// Analytic quotient `a / sqrt(1 + b^2)`.
    Aq,
    /// Componentwise IEEE maximum.
    Fmax,
    /// Componentwise IEEE minimum.
    Fmin,
    /// Power `a^b`.
    Pow,
    /// Absolute value.
    Abs,
    /// Arc cosine.
    Acos,
    /// Arc sine.
    Asin,
    /// Arc tangent.
    Atan,
    /// Real cube root.
    Cbrt,
    /// Ceiling.
    Ceil,
    /// Cosine.
    Cos,
    /// Hyperbolic cosine.
    Cosh,
    /// Exponential.
    Exp,
    /// Floor.
    Floor,
    /// Natural logarithm.
    Log,
    /// `ln(|x|)`.
    Logabs,
    /// `ln(1 + x)`.
    Log1p,
    /// Sine.
    Sin,
    /// Hyperbolic sine.
    Sinh,
    /// Square root.
    Sqrt,
    /// `sqrt(|x|)`.
    Sqrtabs,
    /// Tangent.
    Tan,
    /// Hyperbolic tangent.
    Tanh,
    /// `x * x` (not `pow(x, 2)`).
    Square,
    /// User-extension kind; evaluation requires explicit kernel registration.
    Dynamic,
    /// Constant leaf; `value` holds the constant.
    Constant,
    /// Variable leaf; `hash` selects the dataset column, `value` is a
    /// multiplicative weight applied to it.
    Variable,
}

impl NodeKind {
    /// Number of node kinds.
    pub const COUNT: usize = 31;

    /// Stable index of this kind, used as the dispatch-table key.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// True for the Constant and Variable leaf kinds.
    #[inline]
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Constant | NodeKind::Variable)
    }

    /// True when argument order does not matter (Add, Mul, Fmax, Fmin).
    #[inline]
    pub fn is_commutative(self) -> bool {
        matches!(self, NodeKind::Add | NodeKind::Mul | NodeKind::Fmax | NodeKind::Fmin)
    }

    /// True for kinds whose kernels accept arity above two.
    #[inline]
    pub fn is_variadic(self) -> bool {
        matches!(
            self,
            NodeKind::Add
                | NodeKind::Mul
                | NodeKind::Sub
                | NodeKind::Div
                | NodeKind::Fmax
                | NodeKind::Fmin
        )
    }

    /// True for the single-argument elementwise kinds.
    #[inline]
    pub fn is_unary(self) -> bool {
        NodeKind::Abs.index() <= self.index() && self.index() <= NodeKind::Square.index()
    }

    /// Default arity assigned by [`Node::new`]: 2 for the n-ary arithmetic
    /// group, 1 for unary kinds, 0 otherwise.
    pub fn default_arity(self) -> u16 {
        if self.index() <= NodeKind::Pow.index() {
            2
        } else if self.is_unary() {
            1
        } else {
            0
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Add => "add",
            NodeKind::Mul => "mul",
            NodeKind::Sub => "sub",
            NodeKind::Div => "div",
            NodeKind::Aq => "aq",
            NodeKind::Fmax => "fmax",
            NodeKind::Fmin => "fmin",
            NodeKind::Pow => "pow",
            NodeKind::Abs => "abs",
            NodeKind::Acos => "acos",
            NodeKind::Asin => "asin",
            NodeKind::Atan => "atan",
            NodeKind::Cbrt => "cbrt",
            NodeKind::Ceil => "ceil",
            NodeKind::Cos => "cos",
            NodeKind::Cosh => "cosh",
            NodeKind::Exp => "exp",
            NodeKind::Floor => "floor",
            NodeKind::Log => "log",
            NodeKind::Logabs => "logabs",
            NodeKind::Log1p => "log1p",
            NodeKind::Sin => "sin",
            NodeKind::Sinh => "sinh",
            NodeKind::Sqrt => "sqrt",
            NodeKind::Sqrtabs => "sqrtabs",
            NodeKind::Tan => "tan",
            NodeKind::Tanh => "tanh",
            NodeKind::Square => "square",
            NodeKind::Dynamic => "dynamic",
            NodeKind::Constant => "constant",
            NodeKind::Variable => "variable",
        }
    }

    /// Intrinsic identity hash for operator nodes of this kind.
    pub(crate) fn identity_hash(self) -> u64 {
        let mut h = FxHasher::default();
        h.write_usize(self.index());
        h.finish()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One node of a postorder-encoded expression tree.
///
/// `length` is the number of nodes in this node's subtree *excluding*
/// itself; together with the postorder layout it gives O(1) sibling
/// traversal: the sibling to the left of node `i` sits at
/// `i - (length[i] + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Intrinsic identity: the dataset column hash for variables, a
    /// kind-derived constant for operators.
    pub hash: u64,
    /// Structural hash of the subtree rooted here; filled by
    /// [`Tree::hash`](crate::Tree::hash), not read by evaluation.
    pub calculated_hash: u64,
    /// Constant value (Constant), multiplicative weight (Variable);
    /// unused for operators.
    pub value: Float,
    /// Number of direct children.
    pub arity: u16,
    /// Subtree node count, excluding this node.
    pub length: u16,
    /// Height of the subtree rooted here (leaves have depth 1).
    pub depth: u16,
    /// Distance from the root (the root has level 0).
    pub level: u16,
    /// Index of the parent node; the root keeps 0.
    pub parent: u16,
    /// Operator kind.
    pub kind: NodeKind,
    /// Marks `value` as a learnable parameter consumed by the derivative
    /// calculator. Only valid on leaves.
    pub optimize: bool,
    /// Diagnostic flag; evaluation treats disabled trees as undefined input.
    pub enabled: bool,
}

impl Node {
    /// Create a node of the given kind with its default arity and a
    /// kind-derived identity hash. `value` starts at 1.
    pub fn new(kind: NodeKind) -> Self {
        let arity = kind.default_arity();
        let hash = kind.identity_hash();
        Node {
            hash,
            calculated_hash: hash,
            value: 1.0,
            arity,
            length: arity,
            depth: 1,
            level: 0,
            parent: 0,
            kind,
            optimize: false,
            enabled: true,
        }
    }

    /// Create a constant leaf.
    pub fn constant(value: Float) -> Self {
        let mut node = Node::new(NodeKind::Constant);
        node.value = value;
        node
    }

    /// Create a variable leaf referencing a dataset column by hash, with a
    /// multiplicative weight.
    pub fn variable(hash: u64, weight: Float) -> Self {
        let mut node = Node::new(NodeKind::Variable);
        node.hash = hash;
        node.calculated_hash = hash;
        node.value = weight;
        node
    }

    /// Mark `value` as a learnable parameter.
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Set the declared arity (and provisional length) of an operator node.
    pub fn with_arity(mut self, arity: u16) -> Self {
        self.arity = arity;
        self.length = arity;
        self
    }

    /// True when this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.arity == 0
    }

    /// True for constant leaves.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.kind == NodeKind::Constant
    }

    /// True for variable leaves.
    #[inline]
    pub fn is_variable(&self) -> bool {
        self.kind == NodeKind::Variable
    }
}

//! The compute graph arena.
//!
//! A [`Dag`] owns every node. Constructors are "smart": a node structurally
//! identical to an existing one is not added again (its id is returned
//! instead), and when rewriting is enabled trivial expressions are simplified
//! on the way in (`x + 0 → x`, `1 * x → x`, literal folding, ...).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::graph::op::{format_lit, BinaryOp, Op, OpId, UnaryOp};

/// Records that a node's output feeds input slot `index` of `op`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Use {
    pub op: OpId,
    pub index: usize,
}

/// Everything below a root: nodes in topological order, free variables sorted
/// by name, and the users of each node.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub order: Vec<OpId>,
    pub vars: Vec<OpId>,
    pub uses: BTreeMap<OpId, BTreeSet<Use>>,
}

/// A compute graph.
#[derive(Debug, Clone)]
pub struct Dag {
    nodes: Vec<Op>,
    index: HashMap<Op, OpId>,
    rewrite: bool,
}

impl Default for Dag {
    fn default() -> Self {
        Dag::new()
    }
}

impl Dag {
    /// Empty graph with rewriting enabled.
    pub fn new() -> Self {
        Dag::with_rewrite(true)
    }

    pub fn with_rewrite(rewrite: bool) -> Self {
        Dag { nodes: Vec::new(), index: HashMap::new(), rewrite }
    }

    /// Whether smart constructors simplify expressions.
    pub fn rewrites(&self) -> bool {
        self.rewrite
    }

    /// Forget every node. Previously returned ids become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn op(&self, id: OpId) -> &Op {
        &self.nodes[id.index()]
    }

    pub fn inputs(&self, id: OpId) -> &[OpId] {
        self.op(id).inputs()
    }

    pub fn label(&self, id: OpId) -> String {
        self.op(id).label()
    }

    /// Name of a variable node.
    pub fn var_name(&self, id: OpId) -> Option<&str> {
        match self.op(id) {
            Op::Var(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the existing id of a node equal to `op`, or adds it.
    fn unify(&mut self, op: Op) -> OpId {
        if let Some(&id) = self.index.get(&op) {
            return id;
        }
        let id = OpId(self.nodes.len() as u32);
        debug_assert!(op.inputs().iter().all(|i| *i < id));
        self.index.insert(op.clone(), id);
        self.nodes.push(op);
        id
    }

    fn lit_of(&self, id: OpId) -> Option<f64> {
        self.op(id).lit_value()
    }

    fn is_lit(&self, id: OpId, value: f64) -> bool {
        self.op(id).is_lit(value)
    }

    // ── leaves ──────────────────────────────────────────────────────────────

    /// The variable with the given name.
    pub fn var(&mut self, name: &str) -> OpId {
        self.unify(Op::Var(name.to_owned()))
    }

    pub fn x(&mut self) -> OpId {
        self.var("x")
    }

    pub fn y(&mut self) -> OpId {
        self.var("y")
    }

    pub fn z(&mut self) -> OpId {
        self.var("z")
    }

    /// The literal with the given value. `-0.0` becomes `0.0`.
    pub fn lit(&mut self, f: f64) -> OpId {
        let f = if f == 0.0 { 0.0 } else { f };
        self.unify(Op::Lit(f))
    }

    pub fn lit0(&mut self) -> OpId {
        self.lit(0.0)
    }

    pub fn lit1(&mut self) -> OpId {
        self.lit(1.0)
    }

    pub fn lit2(&mut self) -> OpId {
        self.lit(2.0)
    }

    // ── operators ───────────────────────────────────────────────────────────

    pub fn unary(&mut self, op: UnaryOp, a: OpId) -> OpId {
        if self.rewrite {
            if let Some(v) = self.lit_of(a) {
                return self.lit(op.apply(v));
            }
            // -(-x) → x
            if op == UnaryOp::Neg {
                if let Op::Unary(UnaryOp::Neg, [inner]) = *self.op(a) {
                    return inner;
                }
            }
        }
        self.unify(Op::Unary(op, [a]))
    }

    pub fn binary(&mut self, op: BinaryOp, a: OpId, b: OpId) -> OpId {
        if self.rewrite {
            if let Some(id) = self.simplify(op, a, b) {
                return id;
            }
        }
        self.unify(Op::Binary(op, [a, b]))
    }

    fn simplify(&mut self, op: BinaryOp, a: OpId, b: OpId) -> Option<OpId> {
        if let (Some(x), Some(y)) = (self.lit_of(a), self.lit_of(b)) {
            return Some(self.lit(op.apply(x, y)));
        }
        match op {
            BinaryOp::Add if self.is_lit(a, 0.0) => Some(b),
            BinaryOp::Add | BinaryOp::Sub if self.is_lit(b, 0.0) => Some(a),
            BinaryOp::Sub if self.is_lit(a, 0.0) => Some(self.neg(b)),
            BinaryOp::Mul if self.is_lit(a, 0.0) || self.is_lit(b, 0.0) => Some(self.lit0()),
            BinaryOp::Mul if self.is_lit(a, 1.0) => Some(b),
            BinaryOp::Mul | BinaryOp::Div if self.is_lit(b, 1.0) => Some(a),
            BinaryOp::Pow if self.is_lit(b, 1.0) => Some(a),
            BinaryOp::Pow if self.is_lit(b, 0.0) => Some(self.lit1()),
            _ => None,
        }
    }

    pub fn add(&mut self, a: OpId, b: OpId) -> OpId {
        self.binary(BinaryOp::Add, a, b)
    }

    pub fn sub(&mut self, a: OpId, b: OpId) -> OpId {
        self.binary(BinaryOp::Sub, a, b)
    }

    pub fn mul(&mut self, a: OpId, b: OpId) -> OpId {
        self.binary(BinaryOp::Mul, a, b)
    }

    pub fn div(&mut self, a: OpId, b: OpId) -> OpId {
        self.binary(BinaryOp::Div, a, b)
    }

    pub fn pow(&mut self, a: OpId, b: OpId) -> OpId {
        self.binary(BinaryOp::Pow, a, b)
    }

    pub fn neg(&mut self, a: OpId) -> OpId {
        self.unary(UnaryOp::Neg, a)
    }

    pub fn exp(&mut self, a: OpId) -> OpId {
        self.unary(UnaryOp::Exp, a)
    }

    pub fn log(&mut self, a: OpId) -> OpId {
        self.unary(UnaryOp::Log, a)
    }

    pub fn sin(&mut self, a: OpId) -> OpId {
        self.unary(UnaryOp::Sin, a)
    }

    pub fn cos(&mut self, a: OpId) -> OpId {
        self.unary(UnaryOp::Cos, a)
    }

    /// Gradient holder: `inputs[0]` is the result, `inputs[i + 1]` the
    /// partial derivative with respect to `vars[i]`.
    pub fn grad(&mut self, inputs: Vec<OpId>, vars: Vec<OpId>) -> OpId {
        debug_assert_eq!(inputs.len(), vars.len() + 1);
        self.unify(Op::Grad { inputs, vars })
    }

    // ── traversal ───────────────────────────────────────────────────────────

    /// Walks everything reachable from `root`.
    pub fn analyze(&self, root: OpId) -> Analysis {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        let mut analysis = Analysis::default();

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            analysis.order.push(id);
            if let Op::Var(_) = self.op(id) {
                analysis.vars.push(id);
            }
            for (index, &input) in self.inputs(id).iter().enumerate() {
                analysis.uses.entry(input).or_default().insert(Use { op: id, index });
                stack.push(input);
            }
        }

        analysis.order.sort_unstable();
        analysis.vars.sort_by(|a, b| self.var_name(*a).cmp(&self.var_name(*b)));
        analysis
    }

    /// Free variables below `root`, sorted by name.
    pub fn free_vars(&self, root: OpId) -> Vec<OpId> {
        self.analyze(root).vars
    }

    /// Names of the free variables below `root`, sorted.
    pub fn free_var_names(&self, root: OpId) -> Vec<String> {
        self.free_vars(root)
            .into_iter()
            .filter_map(|id| self.var_name(id).map(str::to_owned))
            .collect()
    }

    /// Infix rendering of the expression rooted at `id`.
    ///
    /// Shared subexpressions are printed at every use. Uses an explicit stack,
    /// so arbitrarily deep graphs render without recursion.
    pub fn display(&self, id: OpId) -> String {
        let mut out = String::new();
        let mut stack = vec![Piece::Node(id)];
        while let Some(piece) = stack.pop() {
            let id = match piece {
                Piece::Text(t) => {
                    out.push_str(t);
                    continue;
                }
                Piece::Node(id) => id,
            };
            match self.op(id) {
                Op::Lit(v) => out.push_str(&format_lit(*v)),
                Op::Var(name) => out.push_str(name),
                Op::Unary(UnaryOp::Neg, [a]) => {
                    out.push_str("(-");
                    stack.extend([Piece::Text(")"), Piece::Node(*a)]);
                }
                Op::Unary(op, [a]) => {
                    out.push('(');
                    out.push_str(op.name());
                    out.push('(');
                    stack.extend([Piece::Text("))"), Piece::Node(*a)]);
                }
                Op::Binary(op, [a, b]) => {
                    out.push('(');
                    stack.extend([
                        Piece::Text(")"),
                        Piece::Node(*b),
                        Piece::Text(" "),
                        Piece::Text(op.symbol()),
                        Piece::Text(" "),
                        Piece::Node(*a),
                    ]);
                }
                Op::Grad { inputs, .. } => {
                    out.push('{');
                    stack.push(Piece::Text("}"));
                    for (i, input) in inputs.iter().enumerate().rev() {
                        stack.push(Piece::Node(*input));
                        if i > 0 {
                            stack.push(Piece::Text(", "));
                        }
                    }
                }
            }
        }
        out
    }
}

/// Pending output of [`Dag::display`], popped last-in first-out.
enum Piece {
    Node(OpId),
    Text(&'static str),
}

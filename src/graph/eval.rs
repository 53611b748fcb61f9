//! Numeric evaluation of a compute graph.
//!
//! Nodes are evaluated in ascending id order (a topological order, see
//! [`OpId`]), so every input value exists before its users need it. Each
//! reachable node's value is kept in the returned [`Evaluation`].

use std::collections::HashMap;

use crate::displaylevel;
use crate::graph::dag::Dag;
use crate::graph::error::GraphError;
use crate::graph::op::{Op, OpId};

/// Variable name → value.
pub type Env = HashMap<String, f64>;

/// Values computed by one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    root: OpId,
    values: Vec<Option<f64>>,
    /// For a gradient root: the value of each of its inputs.
    grad_results: Vec<f64>,
    /// For a gradient root: names of the variables, in partial-derivative order.
    grad_vars: Vec<String>,
}

impl Evaluation {
    /// Value of `id`, if it was reachable from the root.
    pub fn value(&self, id: OpId) -> Option<f64> {
        self.values.get(id.index()).copied().flatten()
    }

    /// Value of the root.
    pub fn result(&self) -> f64 {
        self.value(self.root).unwrap_or(f64::NAN)
    }

    /// Everything the root produces: for a gradient root the result followed
    /// by each partial derivative, otherwise just the result.
    pub fn results(&self) -> Vec<f64> {
        if self.grad_results.is_empty() {
            vec![self.result()]
        } else {
            self.grad_results.clone()
        }
    }

    /// Partial derivative with respect to `var` (gradient roots only).
    pub fn grad(&self, var: &str) -> Option<f64> {
        let i = self.grad_vars.iter().position(|v| v == var)?;
        self.grad_results.get(i + 1).copied()
    }

    /// Variables in partial-derivative order (gradient roots only).
    pub fn grad_vars(&self) -> &[String] {
        &self.grad_vars
    }
}

impl Dag {
    /// Evaluate `root`, binding `values` to the free variables in name order.
    pub fn eval(&self, root: OpId, values: &[f64]) -> Result<Evaluation, GraphError> {
        let vars = self.free_var_names(root);
        if vars.len() != values.len() {
            return Err(GraphError::ArityMismatch { expected: vars.len(), got: values.len() });
        }
        let env: Env = vars.into_iter().zip(values.iter().copied()).collect();
        self.eval_env(root, &env)
    }

    /// Evaluate `root` with variable values looked up in `env`.
    pub fn eval_env(&self, root: OpId, env: &Env) -> Result<Evaluation, GraphError> {
        let order = self.analyze(root).order;
        let mut values: Vec<Option<f64>> = vec![None; self.len()];

        for id in order {
            let op = self.op(id);
            let ins: Vec<f64> = op
                .inputs()
                .iter()
                .map(|i| values[i.index()].unwrap_or(f64::NAN))
                .collect();

            let v = match op {
                Op::Lit(v) => *v,
                Op::Var(name) => *env
                    .get(name)
                    .ok_or_else(|| GraphError::UnboundVariable(name.clone()))?,
                Op::Unary(u, _) => u.apply(ins[0]),
                Op::Binary(b, _) => b.apply(ins[0], ins[1]),
                Op::Grad { .. } => ins[0],
            };

            if !matches!(op, Op::Lit(_) | Op::Var(_)) {
                if let Some(warning) = self.non_finite_warning(id, v, &ins) {
                    displaylevel!(2, "{}", warning);
                }
            }
            values[id.index()] = Some(v);
        }

        let (grad_results, grad_vars) = match self.op(root) {
            Op::Grad { inputs, vars } => (
                inputs.iter().map(|i| values[i.index()].unwrap_or(f64::NAN)).collect(),
                vars.iter()
                    .filter_map(|v| self.var_name(*v).map(str::to_owned))
                    .collect(),
            ),
            _ => (Vec::new(), Vec::new()),
        };

        Ok(Evaluation { root, values, grad_results, grad_vars })
    }

    /// Warning for a NaN or infinite node value, naming the node by id and
    /// operator only.
    fn non_finite_warning(&self, id: OpId, v: f64, ins: &[f64]) -> Option<String> {
        let what = if v.is_nan() {
            "NaN"
        } else if v.is_infinite() {
            "infinite"
        } else {
            return None;
        };
        Some(format!(
            "Warning: encountered {} value in {} ({})\nInputs were: {:?}\n",
            what,
            id,
            self.op(id).label(),
            ins
        ))
    }
}

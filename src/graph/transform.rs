//! A compute graph used directly as the harness transformation.
//!
//! This is the in-process counterpart of the function emitted by
//! [`Dag::llvm`]: inputs bind to the free variables in name order, a plain
//! graph writes its value to output slot 0, and a gradient graph writes the
//! value followed by each partial derivative.

use crate::{debugoutput, displaylevel};
use crate::graph::dag::Dag;
use crate::graph::error::GraphError;
use crate::graph::op::{Op, OpId};
use crate::graph::parse::parse;
use crate::harness::Transform;

#[derive(Debug, Clone)]
pub struct GraphTransform {
    dag: Dag,
    root: OpId,
    vars: Vec<String>,
    values: Vec<f64>,
}

impl GraphTransform {
    /// Wrap an existing graph.
    pub fn new(dag: Dag, root: OpId) -> Self {
        let vars = dag.free_var_names(root);
        let values = vec![0.0; vars.len()];
        GraphTransform { dag, root, vars, values }
    }

    /// Parse `src`; with `backwards` the transformation computes the gradient.
    pub fn compile(src: &str, backwards: bool) -> Result<Self, GraphError> {
        let mut dag = Dag::new();
        let mut root = parse(&mut dag, src)?;
        if backwards {
            root = dag.backwards(root)?;
        }
        debugoutput!("compiled '{}' into {} nodes\n", src, dag.len());
        Ok(GraphTransform::new(dag, root))
    }

    /// Free variables in the order inputs are bound to them.
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn root(&self) -> OpId {
        self.root
    }

    /// Number of output slots this graph produces.
    pub fn num_outputs(&self) -> usize {
        match self.dag.op(self.root) {
            Op::Grad { inputs, .. } => inputs.len(),
            _ => 1,
        }
    }
}

impl Transform for GraphTransform {
    /// Missing inputs read as `0.0`, extra inputs are ignored, and writes stop
    /// at the end of `output`.
    fn apply(&mut self, input: &[f64], output: &mut [f64]) {
        if input.len() != self.vars.len() {
            displaylevel!(
                3,
                "graph expects {} inputs ({}), got {}\n",
                self.vars.len(),
                self.vars.join(", "),
                input.len()
            );
        }
        for (i, slot) in self.values.iter_mut().enumerate() {
            *slot = input.get(i).copied().unwrap_or(0.0);
        }

        match self.dag.eval(self.root, &self.values) {
            Ok(ev) => {
                for (slot, v) in output.iter_mut().zip(ev.results()) {
                    *slot = v;
                }
            }
            Err(e) => displaylevel!(1, "mll: {}\n", e),
        }
    }
}

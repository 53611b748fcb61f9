//! Graphviz (DOT) rendering of a compute graph.
//!
//! Variables get a distinct fill hue each; edges from the partial
//! derivatives into a gradient holder are drawn in the color of the variable
//! they belong to. When an [`Evaluation`] is supplied, every computed node
//! except literals and gradient holders shows its value under the label.

use std::fmt::Write;

use crate::graph::dag::Dag;
use crate::graph::eval::Evaluation;
use crate::graph::op::{format_lit, Op, OpId};

/// `color=...,style=filled,fillcolor=...` for a hue in `[0, 1)`.
fn color_attr(hue: f64) -> String {
    format!(
        "color=\"{:.6} .5 .75\",style=filled,fillcolor=\"{:.6} .5 .75\"",
        hue, hue
    )
}

fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Dag {
    /// DOT source for everything reachable from `root`.
    pub fn dot(&self, root: OpId, values: Option<&Evaluation>) -> String {
        let analysis = self.analyze(root);
        let n = analysis.vars.len();
        let hue_of = |var: OpId| -> Option<f64> {
            analysis
                .vars
                .iter()
                .position(|v| *v == var)
                .map(|i| i as f64 / n as f64)
        };

        let mut out = String::new();
        out.push_str("digraph {\n");
        out.push_str("\trankdir=\"TB\"\n");
        out.push_str("\tordering=\"in\"\n");

        for &id in &analysis.order {
            let op = self.op(id);
            let value = match (op, values.and_then(|ev| ev.value(id))) {
                (Op::Lit(_) | Op::Grad { .. }, _) | (_, None) => String::new(),
                (_, Some(v)) => format!("\\n{}", format_lit(v)),
            };
            let col = match op {
                Op::Var(_) => hue_of(id).map(color_attr).unwrap_or_default(),
                _ => String::new(),
            };
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "\t{}[label=\"{}{}\",{}];",
                id,
                escape_label(&op.label()),
                value,
                col
            );

            for (i, &input) in op.inputs().iter().enumerate() {
                let attr = match op {
                    Op::Grad { vars, .. } if i >= 1 => vars
                        .get(i - 1)
                        .and_then(|v| hue_of(*v))
                        .map(color_attr)
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                let _ = writeln!(out, "\t{} -> {}[{}];", input, id, attr);
            }
        }

        out.push_str("}\n");
        out
    }
}

//! Reverse-mode differentiation (backpropagation) over a compute graph.
//!
//! [`Dag::backwards`] adds the nodes computing every partial derivative of a
//! result and wraps them in a gradient holder. The derivative of a node is the
//! sum, over all of its uses, of the user's derivative times the user's local
//! derivative with respect to that input slot.

use crate::graph::dag::{Analysis, Dag};
use crate::graph::error::GraphError;
use crate::graph::op::{BinaryOp, Op, OpId, UnaryOp};

impl Dag {
    /// Returns a gradient holder for `root`: input 0 is `root` itself, input
    /// `i + 1` is the partial derivative of `root` with respect to the `i`-th
    /// free variable (name order).
    pub fn backwards(&mut self, root: OpId) -> Result<OpId, GraphError> {
        let analysis = self.analyze(root);
        let adjoints = self.adjoints(root, &analysis)?;

        let mut inputs = Vec::with_capacity(analysis.vars.len() + 1);
        inputs.push(root);
        for &var in &analysis.vars {
            inputs.push(adjoints[var.index()].unwrap_or_else(|| self.lit0()));
        }
        Ok(self.grad(inputs, analysis.vars))
    }

    /// Node computing d`root`/d`id` for every `id` below `root` that depends
    /// on a variable, indexed by id.
    ///
    /// Ids are topological, so walking `analysis.order` backwards visits every
    /// user of a node before the node itself.
    fn adjoints(
        &mut self,
        root: OpId,
        analysis: &Analysis,
    ) -> Result<Vec<Option<OpId>>, GraphError> {
        let mut varying = vec![false; self.len()];
        for &id in &analysis.order {
            let v = match self.op(id) {
                Op::Var(_) => true,
                op => op.inputs().iter().any(|i| varying[i.index()]),
            };
            varying[id.index()] = v;
        }

        let mut adjoints: Vec<Option<OpId>> = vec![None; self.len()];
        for &id in analysis.order.iter().rev() {
            if !varying[id.index()] {
                continue;
            }
            if id == root {
                adjoints[id.index()] = Some(self.lit1());
                continue;
            }
            let mut total = self.lit0();
            for u in analysis.uses.get(&id).into_iter().flatten() {
                let Some(upstream) = adjoints[u.op.index()] else {
                    continue;
                };
                let local = self.diff(u.op, u.index)?; // duser / dinput
                let term = self.mul(upstream, local);
                total = self.add(total, term);
            }
            adjoints[id.index()] = Some(total);
        }
        Ok(adjoints)
    }

    /// Node computing the derivative of `id`'s output with respect to its
    /// input number `index`.
    pub fn diff(&mut self, id: OpId, index: usize) -> Result<OpId, GraphError> {
        match self.op(id).clone() {
            Op::Lit(_) => Ok(self.lit0()),
            Op::Var(_) | Op::Grad { .. } => Err(GraphError::NotDifferentiable(self.label(id))),
            Op::Unary(op, [a]) => Ok(match op {
                UnaryOp::Neg => self.lit(-1.0),
                UnaryOp::Exp => id,
                UnaryOp::Log => {
                    let one = self.lit1();
                    self.div(one, a)
                }
                UnaryOp::Sin => self.cos(a),
                UnaryOp::Cos => {
                    let s = self.sin(a);
                    self.neg(s)
                }
            }),
            Op::Binary(op, [a, b]) => Ok(match (op, index) {
                (BinaryOp::Add, _) => self.lit1(),
                (BinaryOp::Sub, 0) => self.lit1(),
                (BinaryOp::Sub, _) => self.lit(-1.0),
                (BinaryOp::Mul, 0) => b,
                (BinaryOp::Mul, _) => a,
                (BinaryOp::Div, 0) => {
                    let one = self.lit1();
                    self.div(one, b)
                }
                (BinaryOp::Div, _) => {
                    // -a / b²
                    let bb = self.mul(b, b);
                    let q = self.div(a, bb);
                    self.neg(q)
                }
                (BinaryOp::Pow, 0) => {
                    // b · a^(b-1)
                    let one = self.lit1();
                    let e = self.sub(b, one);
                    let p = self.pow(a, e);
                    self.mul(b, p)
                }
                (BinaryOp::Pow, _) => {
                    // a^b · ln a
                    let l = self.log(a);
                    self.mul(id, l)
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Central finite difference of `root` at `point` along variable `i`.
    fn numeric_partial(dag: &Dag, root: OpId, point: &[f64], i: usize) -> f64 {
        let h = 1e-6;
        let mut hi = point.to_vec();
        let mut lo = point.to_vec();
        hi[i] += h;
        lo[i] -= h;
        (dag.eval(root, &hi).unwrap().result() - dag.eval(root, &lo).unwrap().result()) / (2.0 * h)
    }

    #[test]
    fn gradient_of_sum() {
        let mut dag = Dag::new();
        let x = dag.x();
        let y = dag.y();
        let root = dag.add(x, y);
        let g = dag.backwards(root).unwrap();
        let ev = dag.eval(g, &[2.0, 5.0]).unwrap();
        assert_eq!(ev.results(), vec![7.0, 1.0, 1.0]);
    }

    #[test]
    fn gradient_of_product_with_shared_input() {
        let mut dag = Dag::new();
        let x = dag.x();
        let y = dag.y();
        let xy = dag.mul(x, y);
        let root = dag.mul(xy, x); // x²y
        let g = dag.backwards(root).unwrap();
        let ev = dag.eval(g, &[3.0, 2.0]).unwrap();
        assert_eq!(ev.result(), 18.0);
        assert_eq!(ev.grad("x"), Some(12.0)); // 2xy
        assert_eq!(ev.grad("y"), Some(9.0)); // x²
    }

    #[test]
    fn gradient_of_square_counts_both_uses() {
        let mut dag = Dag::new();
        let x = dag.x();
        let root = dag.mul(x, x);
        let g = dag.backwards(root).unwrap();
        assert_eq!(dag.eval(g, &[4.0]).unwrap().grad("x"), Some(8.0));
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let mut dag = Dag::new();
        let x = dag.x();
        let y = dag.y();
        // sin(x) * exp(y) / (x + y) - cos(y) ^ 2 + log(x)
        let sx = dag.sin(x);
        let ey = dag.exp(y);
        let num = dag.mul(sx, ey);
        let den = dag.add(x, y);
        let q = dag.div(num, den);
        let cy = dag.cos(y);
        let two = dag.lit2();
        let c2 = dag.pow(cy, two);
        let d = dag.sub(q, c2);
        let lx = dag.log(x);
        let root = dag.add(d, lx);

        let g = dag.backwards(root).unwrap();
        let point = [0.7, 0.3];
        let ev = dag.eval(g, &point).unwrap();
        assert!(close(ev.result(), dag.eval(root, &point).unwrap().result()));
        for (i, name) in ["x", "y"].iter().enumerate() {
            let analytic = ev.grad(name).unwrap();
            let numeric = numeric_partial(&dag, root, &point, i);
            assert!((analytic - numeric).abs() < 1e-5, "{name}: {analytic} vs {numeric}");
        }
    }

    #[test]
    fn gradient_of_pow_in_exponent() {
        let mut dag = Dag::new();
        let x = dag.x();
        let y = dag.y();
        let root = dag.pow(x, y);
        let g = dag.backwards(root).unwrap();
        let ev = dag.eval(g, &[2.0, 3.0]).unwrap();
        assert!(close(ev.grad("x").unwrap(), 12.0)); // y·x^(y-1)
        assert!(close(ev.grad("y").unwrap(), 8.0 * 2f64.ln())); // x^y·ln x
    }

    #[test]
    fn gradient_of_negation() {
        let mut dag = Dag::new();
        let x = dag.x();
        let root = dag.neg(x);
        let g = dag.backwards(root).unwrap();
        assert_eq!(dag.eval(g, &[5.0]).unwrap().grad("x"), Some(-1.0));
    }

    #[test]
    fn gradient_of_variable_itself() {
        let mut dag = Dag::new();
        let x = dag.x();
        let g = dag.backwards(x).unwrap();
        assert_eq!(dag.eval(g, &[5.0]).unwrap().results(), vec![5.0, 1.0]);
    }

    #[test]
    fn gradient_of_constant_has_no_partials() {
        let mut dag = Dag::new();
        let root = dag.lit(3.0);
        let g = dag.backwards(root).unwrap();
        assert_eq!(dag.eval(g, &[]).unwrap().results(), vec![3.0]);
    }

    #[test]
    fn gradient_without_rewrites() {
        let mut dag = Dag::with_rewrite(false);
        let x = dag.x();
        let y = dag.y();
        let root = dag.mul(x, y);
        let g = dag.backwards(root).unwrap();
        let ev = dag.eval(g, &[3.0, 4.0]).unwrap();
        assert_eq!(ev.results(), vec![12.0, 4.0, 3.0]);
    }

    #[test]
    fn diff_of_grad_is_an_error() {
        let mut dag = Dag::new();
        let x = dag.x();
        let g = dag.backwards(x).unwrap();
        assert!(matches!(dag.diff(g, 0), Err(GraphError::NotDifferentiable(_))));
        assert!(matches!(dag.diff(x, 0), Err(GraphError::NotDifferentiable(_))));
    }

    #[test]
    fn backwards_is_hash_consed() {
        let mut dag = Dag::new();
        let x = dag.x();
        let root = dag.exp(x);
        let g1 = dag.backwards(root).unwrap();
        let n = dag.len();
        let g2 = dag.backwards(root).unwrap();
        assert_eq!(g1, g2);
        assert_eq!(dag.len(), n);
    }

    #[test]
    fn gradient_of_long_sum() {
        // x + x + ... + x, left-nested 50k deep.
        let n = 50_000;
        let mut dag = Dag::new();
        let x = dag.x();
        let mut root = x;
        for _ in 1..n {
            root = dag.add(root, x);
        }
        let g = dag.backwards(root).unwrap();
        let ev = dag.eval(g, &[2.0]).unwrap();
        assert_eq!(ev.results(), vec![2.0 * n as f64, n as f64]);
    }

    #[test]
    fn gradient_of_long_chain_of_distinct_variables() {
        // ((a0 * 0.5 + a1) * 0.5 + a2) * 0.5 + ..., built without rewriting:
        // the partial for a_i is 0.5^(n - 1 - i).
        let n = 20_000;
        let mut dag = Dag::with_rewrite(false);
        let k = dag.lit(0.5);
        let mut root = dag.var("a00000");
        for i in 1..n {
            let v = dag.var(&format!("a{:05}", i));
            let scaled = dag.mul(root, k);
            root = dag.add(scaled, v);
        }
        let g = dag.backwards(root).unwrap();
        let ev = dag.eval(g, &vec![1.0; n]).unwrap();
        let last = format!("a{:05}", n - 1);
        let second_last = format!("a{:05}", n - 2);
        assert_eq!(ev.grad(&last), Some(1.0));
        assert_eq!(ev.grad(&second_last), Some(0.5));
        assert_eq!(ev.grad("a00000"), Some(0.0)); // 0.5^19999 underflows
    }
}

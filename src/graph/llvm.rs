//! LLVM IR emission.
//!
//! [`Dag::llvm`] emits a module defining the function the harness calls:
//!
//! ```text
//! define void @mll(ptr noundef noalias %_input, ptr noundef noalias %_output)
//! ```
//!
//! Free variable `i` (name order) is loaded from `_input[i]`. A plain root is
//! stored to `_output[0]`; a gradient root stores its result and every
//! partial derivative to `_output[0..=n]`, which is the layout the harness
//! allocates for `-b`.
//!
//! Pointers are opaque (`ptr`). Literals are written as hexadecimal doubles
//! so that every value round-trips exactly.

use std::fmt::Write;

use crate::graph::dag::Dag;
use crate::graph::error::GraphError;
use crate::graph::op::{BinaryOp, Op, OpId, UnaryOp};

/// Intrinsics the generated code may call.
const INTRINSIC_DECLS: &str = "\
declare double @llvm.pow.f64(double %Val, double %Power)
declare double @llvm.log.f64(double %Val)
declare double @llvm.exp.f64(double %Val)
declare double @llvm.sin.f64(double %Val)
declare double @llvm.cos.f64(double %Val)
";

/// Signature of the generated entry point.
pub const MLL_SIGNATURE: &str =
    "define void @mll(ptr noundef noalias %_input, ptr noundef noalias %_output)";

/// Exact hexadecimal spelling of a double constant.
pub fn llvm_double(v: f64) -> String {
    format!("0x{:016X}", v.to_bits())
}

/// Local value name for a variable. Simple names are used as-is; anything
/// that could clash with the generated `%_...` temporaries is quoted and
/// prefixed.
fn var_ref(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '$' || c == '.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '$' | '.' | '_' | '-'));
    if simple {
        return format!("%{}", name);
    }
    let mut quoted = String::from("%\"var.");
    for b in name.bytes() {
        if (0x20..0x7F).contains(&b) && b != b'"' && b != b'\\' {
            quoted.push(b as char);
        } else {
            let _ = write!(quoted, "\\{:02X}", b);
        }
    }
    quoted.push('"');
    quoted
}

fn intrinsic(op: UnaryOp) -> Option<&'static str> {
    match op {
        UnaryOp::Neg => None,
        UnaryOp::Exp => Some("@llvm.exp.f64"),
        UnaryOp::Log => Some("@llvm.log.f64"),
        UnaryOp::Sin => Some("@llvm.sin.f64"),
        UnaryOp::Cos => Some("@llvm.cos.f64"),
    }
}

impl Dag {
    /// LLVM IR module computing `root` into `_output`.
    pub fn llvm(&self, root: OpId) -> Result<String, GraphError> {
        let analysis = self.analyze(root);
        if analysis
            .order
            .iter()
            .any(|&id| id != root && matches!(self.op(id), Op::Grad { .. }))
        {
            return Err(GraphError::NestedGrad);
        }

        let mut names: Vec<Option<String>> = vec![None; self.len()];
        let mut out = String::new();
        out.push_str(INTRINSIC_DECLS);
        out.push('\n');
        out.push_str(MLL_SIGNATURE);
        out.push_str(" {\n");

        // load vars
        for (i, &var) in analysis.vars.iter().enumerate() {
            let name = var_ref(self.var_name(var).unwrap_or_default());
            let _ = writeln!(out, "\t%_in{} = getelementptr inbounds double, ptr %_input, i64 {}", i, i);
            let _ = writeln!(out, "\t{} = load double, ptr %_in{}", name, i);
            names[var.index()] = Some(name);
        }

        // body
        for &id in &analysis.order {
            let op = self.op(id);
            if let Op::Lit(v) = op {
                names[id.index()] = Some(llvm_double(*v));
                continue;
            }
            let operand = |i: &OpId| names[i.index()].clone().unwrap_or_default();
            let line = match op {
                Op::Lit(_) | Op::Var(_) | Op::Grad { .. } => continue,
                Op::Unary(UnaryOp::Neg, [a]) => format!("fneg double {}", operand(a)),
                Op::Unary(op, [a]) => format!(
                    "call double {}(double {})",
                    intrinsic(*op).unwrap_or_default(),
                    operand(a)
                ),
                Op::Binary(BinaryOp::Pow, [a, b]) => format!(
                    "call double @llvm.pow.f64(double {}, double {})",
                    operand(a),
                    operand(b)
                ),
                Op::Binary(op, [a, b]) => {
                    let instr = match op {
                        BinaryOp::Add => "fadd",
                        BinaryOp::Sub => "fsub",
                        BinaryOp::Mul => "fmul",
                        BinaryOp::Div | BinaryOp::Pow => "fdiv",
                    };
                    format!("{} double {}, {}", instr, operand(a), operand(b))
                }
            };
            let name = format!("%{}", id);
            let _ = writeln!(out, "\t{} = {}", name, line);
            names[id.index()] = Some(name);
        }

        // store
        match self.op(root) {
            Op::Grad { inputs, .. } => {
                for (i, input) in inputs.iter().enumerate() {
                    let value = names[input.index()].clone().unwrap_or_default();
                    let _ = writeln!(out, "\t%_output{} = getelementptr inbounds double, ptr %_output, i64 {}", i, i);
                    let _ = writeln!(out, "\tstore double {}, ptr %_output{}", value, i);
                }
            }
            _ => {
                let value = names[root.index()].clone().unwrap_or_default();
                let _ = writeln!(out, "\tstore double {}, ptr %_output", value);
            }
        }

        out.push_str("\tret void\n");
        out.push_str("}\n");
        Ok(out)
    }
}

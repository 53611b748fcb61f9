//! `mllc` — compile an expression into the `mll` function.
//!
//! ```text
//! mllc 'x * y + sin(x)'               # LLVM IR for the forward function
//! mllc -b 'x * y' -o mll.ll           # value + gradient, written to a file
//! mllc --emit dot 'exp(-x)'           # Graphviz source
//! mllc --emit dot --at 0.5 'exp(-x)'  # ... annotated with computed values
//! ```
//!
//! The IR defines `void @mll(ptr %_input, ptr %_output)`, the function the
//! `mll` harness calls when built with the `extern-mll` feature.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use mll::cli::constants::set_display_level;
use mll::cli::init::init_display_level;
use mll::graph::{parse, Dag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// LLVM IR module defining @mll.
    Llvm,
    /// Graphviz DOT source.
    Dot,
    /// Fully parenthesised infix expression.
    Infix,
}

#[derive(Debug, Parser)]
#[command(name = "mllc", version, about = "Compile an expression into the mll function")]
struct Args {
    /// Expression over free variables, e.g. 'x * y + exp(-x)'.
    expr: String,

    /// Emit the value followed by the partial derivative for each variable.
    #[arg(short, long)]
    backwards: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Emit::Llvm)]
    emit: Emit,

    /// Evaluate at these values (variable name order) and annotate DOT output.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    at: Option<Vec<f64>>,

    /// Disable algebraic simplification while building the graph.
    #[arg(long)]
    no_rewrite: bool,

    /// Write to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn compile(args: &Args) -> anyhow::Result<String> {
    let mut dag = Dag::with_rewrite(!args.no_rewrite);
    let mut root = parse(&mut dag, &args.expr)
        .with_context(|| format!("cannot parse '{}'", args.expr))?;
    if args.backwards {
        root = dag.backwards(root).context("backpropagation failed")?;
    }

    let evaluation = match &args.at {
        Some(values) => Some(
            dag.eval(root, values)
                .with_context(|| format!("cannot evaluate at {:?}", values))?,
        ),
        None => None,
    };

    Ok(match args.emit {
        Emit::Llvm => {
            if evaluation.is_some() {
                bail!("--at only applies to --emit dot");
            }
            dag.llvm(root)?
        }
        Emit::Dot => dag.dot(root, evaluation.as_ref()),
        Emit::Infix => format!("{}\n", dag.display(root)),
    })
}

fn main() -> anyhow::Result<()> {
    set_display_level(init_display_level());
    let args = Args::parse();
    let text = compile(&args)?;

    match &args.output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

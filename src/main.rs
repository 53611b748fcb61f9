//! Binary entry point for the `mll` harness.
//!
//! ```text
//! mll [ -b ] [ <number> ... ]
//! ```
//!
//! # Control flow
//!
//! 1. [`init_from_env`] reads `MLL_DISPLAY_LEVEL` and `MLL_EXPR`.
//! 2. [`parse_args`] splits argv into the input vector and the `-b` flag.
//! 3. [`select_transform`] picks the function to call: the linked foreign
//!    `mll` (feature `extern-mll`), else the `MLL_EXPR` graph, else a
//!    function that writes nothing.
//! 4. [`run`] prints the inputs, calls the function, prints the outputs.
//!
//! The exit code is always 0.

use mll::cli::args::parse_args;
use mll::cli::constants::{set_display_level, PROGRAM_NAME};
use mll::cli::init::{init_from_env, CliInit};
use mll::config::{ENV_EXPR, EXTERN_MLL};
use mll::displaylevel;
use mll::harness::{run, Transform};
#[cfg(not(feature = "extern-mll"))]
use mll::harness::NoOp;

#[cfg(not(feature = "extern-mll"))]
fn select_transform(init: &CliInit, backwards: bool) -> Box<dyn Transform> {
    let Some(expr) = init.expression.as_deref() else {
        displaylevel!(4, "{} not set; outputs stay zero\n", ENV_EXPR);
        return Box::new(NoOp);
    };
    match mll::graph::GraphTransform::compile(expr, backwards) {
        Ok(t) => {
            displaylevel!(
                3,
                "Using {}={} over ({}){}\n",
                ENV_EXPR,
                expr,
                t.vars().join(", "),
                if backwards { " with gradient" } else { "" }
            );
            Box::new(t)
        }
        Err(e) => {
            displaylevel!(1, "{}: ignoring {}={}: {}\n", PROGRAM_NAME, ENV_EXPR, expr, e);
            Box::new(NoOp)
        }
    }
}

#[cfg(feature = "extern-mll")]
fn select_transform(init: &CliInit, _backwards: bool) -> Box<dyn Transform> {
    if init.expression.is_some() {
        displaylevel!(2, "{}: {} is ignored; calling the linked mll\n", PROGRAM_NAME, ENV_EXPR);
    }
    Box::new(mll::abi::extern_mll())
}

fn main() {
    let init = init_from_env();
    set_display_level(init.display_level);
    displaylevel!(4, "{} {} (extern mll: {})\n", PROGRAM_NAME, mll::version_string(), EXTERN_MLL);

    let args = parse_args();
    let mut transform = select_transform(&init, args.backwards);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(&args, transform.as_mut(), &mut out) {
        displaylevel!(1, "{}: cannot write report: {}\n", PROGRAM_NAME, e);
    }
}

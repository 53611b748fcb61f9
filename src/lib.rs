// mll — command-line harness and compute-graph compiler for the `mll` function

pub mod config;
pub mod cli;
pub mod harness;
pub mod abi;
pub mod graph;

// ── Version constants ─────────────────────────────────────────────────────────
pub const MLL_VERSION_MAJOR: u32 = 0;
pub const MLL_VERSION_MINOR: u32 = 1;
pub const MLL_VERSION_RELEASE: u32 = 0;
pub const MLL_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Returns the version string of this crate.
pub fn version_string() -> &'static str {
    MLL_VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use cli::args::{parse_args, parse_args_from, ParsedArgs};
pub use harness::{format_array, output_len, run, NoOp, Transform};
pub use graph::{Dag, GraphTransform};

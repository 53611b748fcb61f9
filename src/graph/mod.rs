//! Compute graphs with reverse-mode differentiation.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`op`]        | `Op` node kinds and the `OpId` handle. |
//! | [`dag`]       | `Dag` arena: hash-consed smart constructors, rewriting, traversal, infix display. |
//! | [`eval`]      | Evaluation with positional values or a name → value `Env`. |
//! | [`backward`]  | Backpropagation producing a gradient holder node. |
//! | [`dot`]       | Graphviz rendering. |
//! | [`llvm`]      | LLVM IR for the `mll` entry point the harness calls. |
//! | [`parse`]     | Infix expression syntax. |
//! | [`transform`] | `GraphTransform`, a graph plugged into the harness. |
//! | [`error`]     | `GraphError` / `ParseError`. |

pub mod op;
pub mod dag;
pub mod eval;
pub mod backward;
pub mod dot;
pub mod llvm;
pub mod parse;
pub mod transform;
pub mod error;

pub use dag::Dag;
pub use error::{GraphError, ParseError};
pub use eval::{Env, Evaluation};
pub use op::{BinaryOp, Op, OpId, UnaryOp};
pub use parse::parse;
pub use transform::GraphTransform;

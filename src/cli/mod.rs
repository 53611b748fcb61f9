//! Command-line interface for the `mll` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`constants`] | Program identity strings, the `-b` flag, and the shared `DISPLAY_LEVEL` atomic with its macros. |
//! | [`arg_utils`] | C `atof`-style number conversion. |
//! | [`init`]      | `CliInit` — settings read from `MLL_DISPLAY_LEVEL` / `MLL_EXPR`. |
//! | [`args`]      | `ParsedArgs` — splits argv into the input vector and the backwards flag. |
//!
//! Typical call sequence: `init_from_env` → `parse_args` → [`crate::harness::run`].

pub mod constants;
pub mod arg_utils;
pub mod init;
pub mod args;

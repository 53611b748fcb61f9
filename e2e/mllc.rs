// e2e/mllc.rs — black-box tests of the `mllc` compiler binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Locate the `mllc` binary produced by Cargo.
fn mllc_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_mllc") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("mllc");
    p
}

fn mllc(args: &[&str]) -> Output {
    Command::new(mllc_bin())
        .args(args)
        .env_remove("MLL_DISPLAY_LEVEL")
        .output()
        .expect("failed to run mllc")
}

fn stdout_of(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).expect("output is UTF-8")
}

// ── 1. Emit formats ──────────────────────────────────────────────────────────

#[test]
fn default_emits_llvm_module() {
    let out = mllc(&["x * y + 1"]);
    assert!(out.status.success());
    let ir = stdout_of(&out);
    assert!(ir.contains("define void @mll(ptr noundef noalias %_input, ptr noundef noalias %_output)"));
    assert_eq!(ir.matches("store double").count(), 1);
    assert!(ir.trim_end().ends_with('}'));
}

#[test]
fn backwards_llvm_stores_value_and_partials() {
    let out = mllc(&["-b", "sin(x) * y"]);
    assert!(out.status.success());
    let ir = stdout_of(&out);
    assert_eq!(ir.matches("store double").count(), 3);
    assert!(ir.contains("@llvm.sin.f64"));
    assert!(ir.contains("call double @llvm.cos.f64"));
}

#[test]
fn emit_infix() {
    let out = mllc(&["--emit", "infix", "-b", "x * x"]);
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "{(x * x), (x + x)}\n");
}

#[test]
fn emit_dot() {
    let out = mllc(&["--emit", "dot", "exp(-x)"]);
    assert!(out.status.success());
    let dot = stdout_of(&out);
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("->"));
}

#[test]
fn emit_dot_at_values() {
    let out = mllc(&["--emit", "dot", "--at", "2,3", "x + y"]);
    assert!(out.status.success());
    assert!(stdout_of(&out).contains("5.0"));
}

// ── 2. Output file ───────────────────────────────────────────────────────────

#[test]
fn output_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mll.ll");
    let out = mllc(&["-o", path.to_str().unwrap(), "x - 1"]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    let ir = fs::read_to_string(&path).unwrap();
    assert!(ir.contains("define void @mll("));
}

#[test]
fn unwritable_output_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("mll.ll");
    let out = mllc(&["-o", path.to_str().unwrap(), "x"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot write"));
}

// ── 3. Errors ────────────────────────────────────────────────────────────────

#[test]
fn parse_error_exits_nonzero() {
    let out = mllc(&["x * (y"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot parse"));
}

#[test]
fn unknown_function_is_reported() {
    let out = mllc(&["tanh(x)"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("tanh"));
}

#[test]
fn at_arity_mismatch() {
    let out = mllc(&["--emit", "dot", "--at", "1", "x + y"]);
    assert!(!out.status.success());
}

#[test]
fn version_flag() {
    let out = mllc(&["--version"]);
    assert!(out.status.success());
    assert!(stdout_of(&out).contains(env!("CARGO_PKG_VERSION")));
}

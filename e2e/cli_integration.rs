// e2e/cli_integration.rs — black-box tests of the `mll` binary.
//
// Spawns the harness with std::process::Command and checks the two report
// lines, the exit status, and the MLL_EXPR / MLL_DISPLAY_LEVEL environment.

use std::path::PathBuf;
use std::process::{Command, Output};

/// Locate the `mll` binary produced by Cargo.
fn mll_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_mll") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("mll");
    p
}

/// Runs `mll` with a clean environment for the variables it reads.
fn mll(args: &[&str], expr: Option<&str>) -> Output {
    let mut cmd = Command::new(mll_bin());
    cmd.args(args).env_remove("MLL_DISPLAY_LEVEL");
    match expr {
        Some(e) => cmd.env("MLL_EXPR", e),
        None => cmd.env_remove("MLL_EXPR"),
    };
    cmd.output().expect("failed to run mll")
}

fn stdout_of(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).expect("report is ASCII")
}

// ── 1. Report format without a transformation ────────────────────────────────

#[cfg(not(feature = "extern-mll"))]
mod untouched_outputs {
    use super::*;

    #[test]
    fn no_arguments() {
        let out = mll(&[], None);
        assert!(out.status.success());
        assert_eq!(stdout_of(&out), "mll()\n=> (0.000000)\n");
    }

    #[test]
    fn forward_single_slot() {
        let out = mll(&["1.5", "-2", "1e3"], None);
        assert_eq!(
            stdout_of(&out),
            "mll(1.500000, -2.000000, 1000.000000)\n=> (0.000000)\n"
        );
    }

    #[test]
    fn backwards_flag_after_numbers() {
        let out = mll(&["1", "2", "-b"], None);
        assert_eq!(
            stdout_of(&out),
            "mll(1.000000, 2.000000)\n=> (0.000000, 0.000000, 0.000000)\n"
        );
    }

    #[test]
    fn repeated_backwards_flag_is_idempotent() {
        let out = mll(&["-b", "-b", "3"], None);
        assert_eq!(stdout_of(&out), "mll(3.000000)\n=> (0.000000, 0.000000)\n");
    }

    #[test]
    fn backwards_without_numbers() {
        let out = mll(&["-b"], None);
        assert_eq!(stdout_of(&out), "mll()\n=> (0.000000)\n");
    }

    #[test]
    fn malformed_number_reads_as_zero() {
        let out = mll(&["abc"], None);
        assert!(out.status.success());
        assert_eq!(stdout_of(&out), "mll(0.000000)\n=> (0.000000)\n");
    }

    #[test]
    fn only_exact_flag_is_a_flag() {
        // "-bb" and "--b" are numbers that happen to parse as 0.
        let out = mll(&["-bb", "--b"], None);
        assert_eq!(stdout_of(&out), "mll(0.000000, 0.000000)\n=> (0.000000)\n");
    }

    #[test]
    fn silent_at_default_level() {
        let out = mll(&["1", "-b"], None);
        assert!(out.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    }
}

// ── 2. MLL_EXPR graphs ───────────────────────────────────────────────────────

#[cfg(not(feature = "extern-mll"))]
mod expression {
    use super::*;

    #[test]
    fn forward_value() {
        let out = mll(&["3", "4"], Some("x * y + 1"));
        assert!(out.status.success());
        assert_eq!(stdout_of(&out), "mll(3.000000, 4.000000)\n=> (13.000000)\n");
    }

    #[test]
    fn value_and_gradient() {
        let out = mll(&["2", "-b", "5"], Some("a * b"));
        assert_eq!(
            stdout_of(&out),
            "mll(2.000000, 5.000000)\n=> (10.000000, 5.000000, 2.000000)\n"
        );
    }

    #[test]
    fn missing_inputs_read_zero() {
        let out = mll(&["2"], Some("x + y"));
        assert_eq!(stdout_of(&out), "mll(2.000000)\n=> (2.000000)\n");
    }

    #[test]
    fn gradient_is_truncated_to_allocation() {
        // Two variables but one number: the harness allocates two slots, so
        // the partial for y is dropped.
        let out = mll(&["-b", "3"], Some("x + 2 * y"));
        assert_eq!(stdout_of(&out), "mll(3.000000)\n=> (3.000000, 1.000000)\n");
    }

    #[test]
    fn invalid_expression_keeps_zero_outputs() {
        let out = mll(&["1"], Some("x +"));
        assert!(out.status.success());
        assert_eq!(stdout_of(&out), "mll(1.000000)\n=> (0.000000)\n");
        let err = String::from_utf8_lossy(&out.stderr);
        assert!(err.contains("MLL_EXPR"), "stderr: {err}");
    }

    #[test]
    fn deeply_nested_expression_is_rejected_not_fatal() {
        let expr = format!("{}x", "-".repeat(100_000));
        let out = mll(&["1"], Some(&expr));
        assert_eq!(out.status.code(), Some(0));
        assert_eq!(stdout_of(&out), "mll(1.000000)\n=> (0.000000)\n");
        let err = String::from_utf8_lossy(&out.stderr);
        assert!(err.contains("nested too deeply"), "stderr: {err}");
    }

    #[test]
    fn long_sum_differentiates() {
        // Kept under the per-variable size limit of the process environment.
        let expr = vec!["x"; 60_000].join("+");
        let out = mll(&["-b", "1"], Some(&expr));
        assert_eq!(out.status.code(), Some(0));
        assert_eq!(stdout_of(&out), "mll(1.000000)\n=> (60000.000000, 60000.000000)\n");
    }

    #[test]
    fn quiet_level_suppresses_diagnostics() {
        let out = Command::new(mll_bin())
            .arg("1")
            .env("MLL_EXPR", "x +")
            .env("MLL_DISPLAY_LEVEL", "0")
            .output()
            .expect("failed to run mll");
        assert!(out.status.success());
        assert!(out.stderr.is_empty());
        assert_eq!(stdout_of(&out), "mll(1.000000)\n=> (0.000000)\n");
    }

    #[test]
    fn verbose_level_names_the_variables() {
        let out = Command::new(mll_bin())
            .args(["1", "2"])
            .env("MLL_EXPR", "exp(u) - v")
            .env("MLL_DISPLAY_LEVEL", "3")
            .output()
            .expect("failed to run mll");
        let err = String::from_utf8_lossy(&out.stderr);
        assert!(err.contains("(u, v)"), "stderr: {err}");
    }
}

// ── 3. Exit status ───────────────────────────────────────────────────────────

#[test]
fn exit_status_is_always_zero() {
    for args in [&[][..], &["-b"][..], &["nan", "inf", "-b"][..], &["--help"][..]] {
        let out = mll(args, None);
        assert_eq!(out.status.code(), Some(0), "args {:?}", args);
        assert_eq!(stdout_of(&out).lines().count(), 2);
    }
}

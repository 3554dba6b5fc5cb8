// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Integration tests for the `rill` binary. Each test runs a fixture
//! program and checks stdout, stderr, and the exit code.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn rill_binary() -> PathBuf {
    // cargo test builds into target/debug; walk up from the test binary.
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("rill");
    path
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_rill(args: &[&str]) -> Output {
    Command::new(rill_binary())
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run rill")
}

fn run_fixture(args: &[&str], name: &str) -> Output {
    let path = fixture(name);
    let mut full: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    full.push(path.to_string_lossy().to_string());
    Command::new(rill_binary())
        .args(&full)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run rill")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ─── rill run ────────────────────────────────────────────────

#[test]
fn run_hello() {
    let out = run_fixture(&["run"], "hello.rill");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Hello from the Language!\n");
}

#[test]
fn bare_filename_runs() {
    let out = run_fixture(&[], "hello.rill");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "Hello from the Language!\n");
}

#[test]
fn run_loops_and_concat() {
    let out = run_fixture(&["run"], "sums.rill");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Result is 45\n0\n2\n4\n");
}

#[test]
fn run_shapes() {
    let out = run_fixture(&["run"], "shapes.rill");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "12 12 0\n3\n");
}

#[test]
fn run_with_imports() {
    let out = run_fixture(&["run"], "app.rill");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "42\nnegative\n");
}

// ─── diagnostics ─────────────────────────────────────────────

#[test]
fn type_errors_fail_without_executing() {
    let out = run_fixture(&["run"], "bad_types.rill");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    let err = stderr(&out);
    assert!(err.contains("typecheck:"), "stderr: {}", err);
    // First-only mode: exactly one diagnostic line.
    assert_eq!(
        err.lines().filter(|l| l.contains("typecheck:")).count(),
        1,
        "stderr: {}",
        err
    );
}

#[test]
fn all_errors_surfaces_every_diagnostic() {
    let out = run_fixture(&["run", "--all-errors"], "bad_types.rill");
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(
        err.lines().filter(|l| l.contains("typecheck:")).count() >= 3,
        "stderr: {}",
        err
    );
}

#[test]
fn diagnostic_line_format_is_stable() {
    let out = run_fixture(&["run"], "bad_types.rill");
    let err = stderr(&out);
    let first = err.lines().next().unwrap_or("");
    // <path>:<line>:<col>: <phase>: <message>
    assert!(
        first.contains("bad_types.rill:2:") && first.contains(": typecheck: "),
        "stderr: {}",
        err
    );
}

#[test]
fn syntax_errors_recover_but_fail() {
    let out = run_fixture(&["run"], "syntax_error.rill");
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("parse:"), "stderr: {}", err);
}

#[test]
fn runtime_error_renders_call_chain() {
    let out = run_fixture(&["run"], "div_zero.rill");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "before\n");
    let err = stderr(&out);
    assert!(err.contains("runtime: division by zero"), "stderr: {}", err);
    assert!(err.contains("in divide"), "stderr: {}", err);
    assert!(err.contains("in main"), "stderr: {}", err);
}

#[test]
fn max_steps_aborts_execution() {
    let out = run_fixture(&["run", "--max-steps", "50"], "sums.rill");
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains("step limit exceeded"),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn json_format_reports_diagnostics() {
    let out = run_fixture(&["run", "--format", "json"], "bad_types.rill");
    assert_eq!(out.status.code(), Some(1));
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&out)).expect("stdout should be a JSON report");
    assert_eq!(report["success"], false);
    assert_eq!(report["diagnostics"][0]["phase"], "typecheck");
    assert!(report["diagnostics"][0]["location"]["line"].is_number());
}

// ─── rill check ──────────────────────────────────────────────

#[test]
fn check_passes_quietly_on_good_programs() {
    let out = run_fixture(&["check"], "hello.rill");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "=== Check OK ===\n");
}

#[test]
fn check_does_not_execute() {
    let out = run_fixture(&["check"], "div_zero.rill");
    // The division by zero never runs; the program is statically fine.
    assert_eq!(out.status.code(), Some(0));
    assert!(!stdout(&out).contains("before"));
}

// ─── misc commands ───────────────────────────────────────────

#[test]
fn lex_dumps_tokens() {
    let out = run_fixture(&["lex"], "hello.rill");
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("Fn"), "{}", text);
    assert!(text.contains("Eof"), "{}", text);
}

#[test]
fn parse_dumps_the_ast() {
    let out = run_fixture(&["parse"], "hello.rill");
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("Program"));
}

#[test]
fn version_and_help() {
    let out = run_rill(&["version"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).starts_with("rill "));

    let out = run_rill(&["help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("Usage:"));
}

#[test]
fn missing_file_is_an_error() {
    let out = run_rill(&["run", "does_not_exist.rill"]);
    assert_eq!(out.status.code(), Some(1));
}

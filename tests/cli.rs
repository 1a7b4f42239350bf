//! End-to-end tests of the `basic-mcp-server` binary.
//!
//! These run the real executable with a scratch home directory so no user
//! configuration file is picked up.

#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_binary(home: &TempDir, args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_basic-mcp-server"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn server");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin)
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for server")
}

fn stderr_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_default_start_logs_ready_line() {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_binary(&home, &[], b"");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1, "stderr was: {lines:?}");
    assert!(lines[0].contains("MCP server ready"));
}

#[test]
fn test_quiet_start_is_silent() {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_binary(&home, &["-q"], b"");

    assert!(output.status.success());
    assert!(stderr_lines(&output).is_empty());
}

#[test]
fn test_answers_on_stdout() {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_binary(
        &home,
        &["-q"],
        b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert_eq!(stdout, "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n");
}

#[test]
fn test_undecodable_input_exits_non_zero() {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_binary(&home, &["-q"], b"not json\n");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert!(stdout.contains("-32700"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = home.path().join("absent.json");
    let output = run_binary(&home, &[missing.to_str().expect("UTF-8 path")], b"");

    assert_eq!(output.status.code(), Some(1));
}

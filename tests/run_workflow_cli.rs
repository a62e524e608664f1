//! Integration tests for the run_workflow CLI, driving the built binary.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn fixture(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Runs the binary with `args`, feeding `stdin` and clearing FLOWWEAVE_* overrides.
fn run_workflow(args: &[&str], stdin: &str) -> Output {
  let mut child = Command::new(env!("CARGO_BIN_EXE_run_workflow"))
    .args(args)
    .env_remove("FLOWWEAVE_MAX_STEPS")
    .env_remove("FLOWWEAVE_HTTP_TIMEOUT_SECS")
    .env_remove("FLOWWEAVE_DEFAULT_USER")
    .env("RUST_LOG", "warn")
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .expect("spawn run_workflow");
  if let Some(mut input) = child.stdin.take() {
    // The process may exit before reading stdin (usage errors).
    let _ = input.write_all(stdin.as_bytes());
  }
  child.wait_with_output().expect("wait for run_workflow")
}

fn stdout(out: &Output) -> String {
  String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
  String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn prints_usage_without_args() {
  let out = run_workflow(&[], "");
  assert!(!out.status.success());
  let err = stderr(&out);
  assert!(err.contains("Usage") || err.contains("usage"), "stderr: {err}");
}

#[test]
fn missing_file_exits_1() {
  let out = run_workflow(&["/nonexistent/graph.json"], "");
  assert_eq!(out.status.code(), Some(1));
  assert!(stderr(&out).contains("Error reading"), "stderr: {}", stderr(&out));
}

#[test]
fn greeting_runs_to_completion() {
  let path = fixture("greeting.json");
  let out = run_workflow(&["--state", "name=Ann", path.to_str().unwrap()], "");
  let text = stdout(&out);
  assert!(out.status.success(), "stdout: {text}\nstderr: {}", stderr(&out));
  assert!(text.contains("Hello Ann"), "stdout: {text}");
  assert!(text.contains("Workflow completed."), "stdout: {text}");
}

#[test]
fn questions_are_answered_from_flags_then_stdin() {
  let path = fixture("survey.json");
  let out = run_workflow(&["--input", "abc", path.to_str().unwrap()], "30\n");
  let text = stdout(&out);
  assert!(out.status.success(), "stdout: {text}\nstderr: {}", stderr(&out));
  assert!(stderr(&out).contains("Please enter a number"));
  assert!(text.contains("How old are you?"), "stdout: {text}");
  assert!(text.contains("Welcome, adult aged 30"), "stdout: {text}");
  assert!(text.contains("Workflow completed."), "stdout: {text}");
}

#[test]
fn session_is_saved_and_resumed() {
  let dir = tempfile::tempdir().expect("temp dir");
  let session = dir.path().join("state").join("session.json");
  let session_str = session.to_str().unwrap();
  let path = fixture("survey.json");
  let graph = path.to_str().unwrap();

  let out = run_workflow(&["--session-file", session_str, graph], "");
  assert!(out.status.success(), "stderr: {}", stderr(&out));
  assert!(stdout(&out).contains("Awaiting input."));
  assert!(session.exists());

  let out = run_workflow(&["--resume", session_str, "--input", "12", graph], "");
  let text = stdout(&out);
  assert!(out.status.success(), "stdout: {text}\nstderr: {}", stderr(&out));
  assert!(text.contains("Sorry, 12 is too young"), "stdout: {text}");
  assert!(text.contains("Workflow completed."), "stdout: {text}");
}

#[test]
fn cycle_fails_with_step_budget() {
  let path = fixture("loop.json");
  let out = run_workflow(&["--no-validate", "--max-steps", "10", path.to_str().unwrap()], "");
  assert_eq!(out.status.code(), Some(1));
  let text = stdout(&out);
  assert!(text.contains("Workflow failed:"), "stdout: {text}");
  assert!(text.contains("maximum iterations (10)"), "stdout: {text}");
}

#[test]
fn env_overrides_max_steps_flag() {
  let path = fixture("loop.json");
  let out = Command::new(env!("CARGO_BIN_EXE_run_workflow"))
    .args(["--no-validate", "--max-steps", "50", path.to_str().unwrap()])
    .env("FLOWWEAVE_MAX_STEPS", "4")
    .env("RUST_LOG", "warn")
    .stdin(Stdio::null())
    .output()
    .expect("run run_workflow");
  assert_eq!(out.status.code(), Some(1));
  assert!(stdout(&out).contains("maximum iterations (4)"));
}

#[test]
fn validation_errors_block_the_run() {
  let path = fixture("no_end.json");
  let out = run_workflow(&[path.to_str().unwrap()], "");
  assert_eq!(out.status.code(), Some(1));
  let err = stderr(&out);
  assert!(err.contains("error NO_END_NODE"), "stderr: {err}");
  assert!(!stdout(&out).contains("bye"));
}

#[test]
fn no_validate_runs_anyway() {
  let path = fixture("no_end.json");
  let out = run_workflow(&["--no-validate", path.to_str().unwrap()], "");
  assert!(out.status.success(), "stderr: {}", stderr(&out));
  let text = stdout(&out);
  assert!(text.contains("bye"));
  assert!(text.contains("Workflow completed."));
}

#[test]
fn validate_only_reports_and_exits() {
  let ok = run_workflow(&["--validate-only", fixture("greeting.json").to_str().unwrap()], "");
  assert!(ok.status.success());
  assert!(stdout(&ok).contains("Graph is valid."));

  let bad = run_workflow(&["--validate-only", fixture("editor_export.json").to_str().unwrap()], "");
  assert_eq!(bad.status.code(), Some(1));
  let err = stderr(&bad);
  assert!(err.contains("error NO_START_NODE"), "stderr: {err}");
  assert!(err.contains("warning ORPHAN_NODE"), "stderr: {err}");
}

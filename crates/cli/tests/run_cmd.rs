//! CLI tests for `cmdtree run` and `cmdtree repl`.

use std::io::Write;
use std::process::{Command, Stdio};

use assert_cmd::cargo;

fn cmdtree() -> Command {
    Command::new(cargo::cargo_bin!("cmdtree"))
}

fn run_json(args: &[&str]) -> (bool, serde_json::Value) {
    let output = cmdtree()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run cmdtree");
    let json = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), json)
}

#[test]
fn run_prints_executor_messages() {
    let (ok, json) = run_json(&["run", "/give Alex diamond 3"]);
    assert!(ok);
    assert_eq!(json["ok"], true);
    assert_eq!(json["messages"][0], "Gave 3 diamond to Alex");
}

#[test]
fn wrong_usage_is_a_diagnostic_with_span() {
    let (ok, json) = run_json(&["run", "/give Alex"]);
    assert!(!ok);
    assert_eq!(json["ok"], false);
    let diag = &json["diagnostic"];
    assert_eq!(diag["id"], "CMD1002");
    assert_eq!(diag["severity"], "error");
    assert_eq!(diag["context"]["command"], "give");
    assert_eq!(diag["context"]["supplied"], "1");
}

#[test]
fn unknown_command_reports_not_found() {
    let (ok, json) = run_json(&["run", "/fly"]);
    assert!(!ok);
    assert_eq!(json["diagnostic"]["id"], "CMD1001");
    assert_eq!(json["diagnostic"]["span"]["start"], 0);
    assert_eq!(json["diagnostic"]["span"]["end"], 4);
}

#[test]
fn console_cannot_teleport_itself() {
    let (ok, json) = run_json(&["run", "/tp 0 64 0"]);
    assert!(!ok);
    assert_eq!(json["diagnostic"]["id"], "CMD1004");
    assert_eq!(json["diagnostic"]["context"]["senderKind"], "console");
}

#[test]
fn repl_runs_every_line_and_fails_if_any_failed() {
    let mut child = cmdtree()
        .args(["repl", "--output", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn repl");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"# setup\nsay hello\n\nop Steve\nstop now\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait repl");

    assert!(!output.status.success());
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["messages"][0], "[console] hello");
    assert_eq!(lines[1]["messages"][0], "Made Steve a server operator");
    assert_eq!(lines[2]["ok"], false);
    assert_eq!(lines[2]["line"], "stop now");
}

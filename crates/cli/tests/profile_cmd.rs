//! CLI tests for `--profile` and `--policy`.

use std::io::Write;
use std::process::Command;

use assert_cmd::cargo;
use tempfile::NamedTempFile;

fn cmdtree() -> Command {
    Command::new(cargo::cargo_bin!("cmdtree"))
}

fn profile(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write profile");
    file
}

const PLAYER: &str = r#"{
  "id": "steve",
  "schema_version": "1.0.0",
  "sender": { "name": "Steve", "kind": "player" },
  "grants": { "world.teleport": true, "chat": true, "chat.say.loud": false }
}"#;

fn run(profile_path: &std::path::Path, extra: &[&str], line: &str) -> (bool, serde_json::Value) {
    let output = cmdtree()
        .arg("--profile")
        .arg(profile_path)
        .args(extra)
        .args(["--output", "json", "run", line])
        .output()
        .expect("run cmdtree");
    let json = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), json)
}

#[test]
fn player_profile_can_teleport_self() {
    let file = profile(PLAYER);
    let (ok, json) = run(file.path(), &[], "/tp 1 2 3");
    assert!(ok, "{json}");
    assert_eq!(json["messages"][0], "Teleported Steve to (1, 2, 3)");
}

#[test]
fn explicit_deny_beats_parent_grant() {
    let file = profile(PLAYER);
    let (ok, _) = run(file.path(), &[], "/say hi");
    assert!(ok);
    let (ok, json) = run(file.path(), &[], "/say loud hi");
    assert!(!ok);
    assert_eq!(json["diagnostic"]["id"], "CMD1003");
    assert_eq!(json["diagnostic"]["context"]["missing"], "chat.say.loud");
}

#[test]
fn player_cannot_stop_server() {
    let file = profile(PLAYER);
    let (ok, json) = run(file.path(), &[], "/stop");
    assert!(!ok);
    assert_eq!(json["diagnostic"]["id"], "CMD1004");
}

#[test]
fn inherit_policy_adds_ancestor_permissions() {
    let file = profile(
        r#"{
  "id": "bulk-only",
  "schema_version": "1.0.0",
  "sender": { "name": "Trader", "kind": "player" },
  "grants": { "items.give.bulk": true }
}"#,
    );
    let (ok, _) = run(file.path(), &["--policy", "leaf-only"], "/give Alex diamond 5");
    assert!(ok);
    let (ok, json) = run(file.path(), &["--policy", "inherit"], "/give Alex diamond 5");
    assert!(!ok);
    assert_eq!(json["diagnostic"]["context"]["missing"], "items.give");
}

#[test]
fn invalid_profile_is_reported() {
    let file = profile(r#"{ "id": "", "schema_version": "1", "sender": { "name": "x", "kind": "y" } }"#);
    let output = cmdtree()
        .arg("--profile")
        .arg(file.path())
        .args(["--output", "json", "run", "/say hi"])
        .output()
        .expect("run cmdtree");
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["diagnostic"]["id"], "CMD2003");
}

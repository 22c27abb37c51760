//! E2E tests for comments, speech texts, user management, and export.
//!
//! Each test runs `lec` as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const ADMIN: &str = "admin@example.com";
const AUTHOR: &str = "demo@example.com";

fn lec_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lec"));
    cmd.current_dir(dir);
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("LECTERN_USER");
    cmd.env_remove("FORMAT");
    cmd.env("LECTERN_LOG", "error");
    cmd
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("lec should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("lec should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 stdout")
}

fn create(dir: &Path, args: &[&str]) -> String {
    let mut cmd = lec_cmd(dir);
    cmd.arg("create").args(args).arg("--json");
    json_of(&mut cmd)["id"]
        .as_str()
        .expect("id field")
        .to_string()
}

/// Project with one subject → training → topic → unit chain; returns
/// `(topic_id, unit_id)`.
fn project_with_unit(dir: &Path) -> (String, String) {
    lec_cmd(dir).arg("init").assert().success();
    let subject = create(dir, &["subject", "--name", "Math"]);
    let training = create(dir, &["training", "--name", "Algebra", "--parent", &subject]);
    let topic = create(dir, &["topic", "--name", "Equations", "--parent", &training]);
    let unit = create(
        dir,
        &[
            "unit",
            "--name",
            "Intro",
            "--parent",
            &topic,
            "--description",
            "Hello",
            "--speech",
            "A",
            "--speech",
            "B",
        ],
    );
    (topic, unit)
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[test]
fn comment_requires_identity() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["comment", "add", "unit", &unit, "Looks good", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing_user"));
}

#[test]
fn comment_author_is_resolved_user_name() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    let added = json_of(lec_cmd(dir.path()).args([
        "--as", AUTHOR, "comment", "add", "unit", &unit, "Nice pacing", "--rating", "4", "--json",
    ]));
    assert_eq!(added["comment"]["author"], "Demo User");
    assert_eq!(added["comment"]["rating"], 4);

    // env var works as well as the flag
    lec_cmd(dir.path())
        .env("LECTERN_USER", ADMIN)
        .args(["comment", "add", "unit", &unit, "Agreed"])
        .assert()
        .success();

    let comments = json_of(lec_cmd(dir.path()).args(["comment", "list", "unit", &unit, "--json"]));
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "Nice pacing");
    assert_eq!(comments[1]["author"], "Admin User");
    assert_eq!(comments[1]["rating"], 0);
}

#[test]
fn rating_above_five_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["--as", AUTHOR, "comment", "add", "unit", &unit, "Wow", "--rating", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 5"));
}

#[test]
fn unknown_user_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["--as", "nobody@example.com", "comment", "add", "unit", &unit, "Hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no user matches"));
}

// ---------------------------------------------------------------------------
// Speech texts
// ---------------------------------------------------------------------------

fn speech_texts(dir: &Path, unit: &str) -> Vec<String> {
    let shown = json_of(lec_cmd(dir).args(["show", "unit", unit, "--json"]));
    shown["item"]["speechTexts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["text"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn speech_edits_use_one_based_positions() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["speech", "add", &unit, "C"])
        .assert()
        .success();
    assert_eq!(speech_texts(dir.path(), &unit), ["A", "B", "C"]);

    lec_cmd(dir.path())
        .args(["speech", "move", &unit, "3", "1"])
        .assert()
        .success();
    assert_eq!(speech_texts(dir.path(), &unit), ["C", "A", "B"]);

    lec_cmd(dir.path())
        .args(["speech", "set", &unit, "2", "A2"])
        .assert()
        .success();
    lec_cmd(dir.path())
        .args(["speech", "remove", &unit, "3"])
        .assert()
        .success();
    assert_eq!(speech_texts(dir.path(), &unit), ["C", "A2"]);
}

#[test]
fn speech_position_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["speech", "remove", &unit, "9", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2007"));
    lec_cmd(dir.path())
        .args(["speech", "remove", &unit, "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start at 1"));
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn only_admins_add_users() {
    let dir = TempDir::new().unwrap();
    project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["--as", AUTHOR, "user", "add", "--name", "Eve", "--email", "eve@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_admin"));

    let added = json_of(lec_cmd(dir.path()).args([
        "--as", ADMIN, "user", "add", "--name", "Eve", "--email", "eve@example.com", "--json",
    ]));
    assert_eq!(added["role"], "author");

    let users = json_of(lec_cmd(dir.path()).args(["user", "list", "--json"]));
    assert_eq!(users.as_array().unwrap().len(), 3);
}

#[test]
fn duplicate_email_is_rejected() {
    let dir = TempDir::new().unwrap();
    project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["--as", ADMIN, "user", "add", "--name", "Dup", "--email", "DEMO@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn update_cannot_take_another_users_email() {
    let dir = TempDir::new().unwrap();
    project_with_unit(dir.path());

    lec_cmd(dir.path())
        .args(["--as", ADMIN, "user", "update", AUTHOR, "--email", ADMIN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // Keeping one's own email (any case) is not a conflict.
    lec_cmd(dir.path())
        .args(["--as", ADMIN, "user", "update", AUTHOR, "--email", &AUTHOR.to_uppercase()])
        .assert()
        .success();

    let users = json_of(lec_cmd(dir.path()).args(["user", "list", "--json"]));
    let emails: Vec<String> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap().to_lowercase())
        .collect();
    assert_eq!(emails.len(), 2);
    assert_ne!(emails[0], emails[1]);

    lec_cmd(dir.path())
        .args(["--as", ADMIN, "user", "add", "--name", "New", "--email", "new@example.com"])
        .assert()
        .success();
}

#[test]
fn admin_can_promote_and_remove_others_but_not_self() {
    let dir = TempDir::new().unwrap();
    project_with_unit(dir.path());

    let promoted = json_of(lec_cmd(dir.path()).args([
        "--as", ADMIN, "user", "update", AUTHOR, "--role", "admin", "--json",
    ]));
    assert_eq!(promoted["role"], "admin");

    lec_cmd(dir.path())
        .args(["--as", ADMIN, "user", "remove", ADMIN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("your own account"));

    lec_cmd(dir.path())
        .args(["--as", AUTHOR, "user", "remove", ADMIN])
        .assert()
        .success();
    let users = json_of(lec_cmd(dir.path()).args(["user", "list", "--json"]));
    assert_eq!(users.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_defaults_to_json_array() {
    let dir = TempDir::new().unwrap();
    project_with_unit(dir.path());

    let out = stdout_of(lec_cmd(dir.path()).args(["export", "subjects"]));
    let parsed: Value = serde_json::from_str(&out).expect("json export");
    assert_eq!(parsed[0]["name"], "Math");
}

#[test]
fn markdown_export_of_unit() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());

    let out = stdout_of(lec_cmd(dir.path()).args([
        "export", "unit", "--id", &unit, "--format", "markdown",
    ]));
    assert!(out.starts_with("# Intro\n\nHello\n\n"));
    assert!(out.contains("## Sprechtexte\n\n1. A\n2. B\n"));
}

#[test]
fn text_export_to_file_reports_success() {
    let dir = TempDir::new().unwrap();
    let (topic, _) = project_with_unit(dir.path());
    let target = dir.path().join("units.txt");

    lec_cmd(dir.path())
        .args(["export", "units", "--parent", &topic, "--format", "text", "--output"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 units as text"));

    let body = std::fs::read_to_string(&target).unwrap();
    assert!(body.starts_with("Intro\nHello\n"));
    assert!(body.contains("1. A\n2. B"));
}

#[test]
fn speech_heading_comes_from_project_config() {
    let dir = TempDir::new().unwrap();
    let (_, unit) = project_with_unit(dir.path());
    std::fs::write(
        dir.path().join(".lectern/config.toml"),
        "[export]\ndefault_format = \"markdown\"\nspeech_heading = \"Script\"\n",
    )
    .unwrap();

    let out = stdout_of(lec_cmd(dir.path()).args(["export", "unit", "--id", &unit]));
    assert!(out.contains("## Script\n"));
    assert!(!out.contains("Sprechtexte"));
}

//! Integration tests for the schemanote CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SCHEMA: &str = "\
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255) NOT NULL
);
";

const MODEL: &str = "class User < ActiveRecord::Base\nend\n";

const USERS_BLOCK: &str = "\
# == Schema Info
#
# Table name: users
#
#  id   :integer          not null, primary key
#  name :string(255)      not null
#
";

/// Get the schemanote binary, run from `dir` so no stray config is picked up
#[allow(deprecated)]
fn schemanote_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("schemanote").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("structure.sql"), SCHEMA).unwrap();
    fs::write(dir.path().join("users.rb"), MODEL).unwrap();
    dir
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    schemanote_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: schemanote"))
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--position"))
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_schema_required() {
    let dir = project();
    schemanote_cmd(&dir)
        .arg("users.rb")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--schema"));
}

#[test]
fn test_annotate_from_sql() {
    let dir = project();
    schemanote_cmd(&dir)
        .args(["--schema", "structure.sql", "users.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Annotated users.rb"));

    let content = fs::read_to_string(dir.path().join("users.rb")).unwrap();
    assert_eq!(content, format!("{}{}", USERS_BLOCK, MODEL));
}

#[test]
fn test_singular_file_name_matches_plural_table() {
    let dir = project();
    fs::write(dir.path().join("user.rb"), MODEL).unwrap();

    schemanote_cmd(&dir)
        .args(["--schema", "structure.sql", "user.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Annotated user.rb"));

    let content = fs::read_to_string(dir.path().join("user.rb")).unwrap();
    assert_eq!(content, format!("{}{}", USERS_BLOCK, MODEL));
}

#[test]
fn test_annotate_after_with_table_flag() {
    let dir = project();
    fs::write(dir.path().join("account.rb"), MODEL).unwrap();

    schemanote_cmd(&dir)
        .args(["-s", "structure.sql", "-t", "users", "-p", "after", "account.rb"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("account.rb")).unwrap();
    assert_eq!(content, format!("{}\n{}", MODEL, USERS_BLOCK));
}

#[test]
fn test_config_file_is_used() {
    let dir = project();
    fs::write(
        dir.path().join("schemanote.toml"),
        "position = \"after\"\nheader = \"== Columns\"\n",
    )
    .unwrap();

    schemanote_cmd(&dir)
        .args(["--schema", "structure.sql", "users.rb"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("users.rb")).unwrap();
    assert!(content.starts_with(MODEL));
    assert!(content.contains("# == Columns\n"));
}

#[test]
fn test_check_fails_when_stale() {
    let dir = project();
    schemanote_cmd(&dir)
        .args(["--schema", "structure.sql", "--check", "users.rb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("users.rb"));

    let content = fs::read_to_string(dir.path().join("users.rb")).unwrap();
    assert_eq!(content, MODEL);
}

#[test]
fn test_check_passes_when_current() {
    let dir = project();
    fs::write(
        dir.path().join("users.rb"),
        format!("{}{}", USERS_BLOCK, MODEL),
    )
    .unwrap();

    schemanote_cmd(&dir)
        .args(["--schema", "structure.sql", "--check", "users.rb"])
        .assert()
        .success();
}

#[test]
fn test_delete_removes_block() {
    let dir = project();
    fs::write(
        dir.path().join("users.rb"),
        format!("{}{}", USERS_BLOCK, MODEL),
    )
    .unwrap();

    schemanote_cmd(&dir)
        .args(["--delete", "users.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed annotation from users.rb"));

    let content = fs::read_to_string(dir.path().join("users.rb")).unwrap();
    assert_eq!(content, MODEL);
}

#[test]
fn test_unknown_table() {
    let dir = project();
    fs::write(dir.path().join("comments.rb"), MODEL).unwrap();

    schemanote_cmd(&dir)
        .args(["--schema", "structure.sql", "comments.rb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("comments"));
}

#[test]
fn test_missing_schema_file() {
    let dir = project();
    schemanote_cmd(&dir)
        .args(["--schema", "missing.sql", "users.rb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.sql"));
}

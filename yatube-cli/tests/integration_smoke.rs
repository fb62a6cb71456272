//! Smoke tests to verify command module wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn yatube(database_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("yatube").unwrap();
    cmd.env("DATABASE_URL", database_url)
        .env_remove("YATUBE_BIND")
        .env_remove("YATUBE_MEDIA_ROOT")
        .env_remove("YATUBE_POSTS_PER_PAGE");
    cmd
}

// === Help Tests ===

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("yatube").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("group"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("yatube").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"));
}

#[test]
fn test_group_create_help() {
    let mut cmd = Command::cargo_bin("yatube").unwrap();
    cmd.arg("group").arg("create").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("URL slug"));
}

// === Group Command Tests ===

#[test]
fn test_group_create_list_delete() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("yatube.db").display());

    yatube(&url)
        .args(["group", "create", "--slug", "cats", "--title", "Cats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created group cats"));

    yatube(&url)
        .args(["group", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cats\tCats"));

    yatube(&url)
        .args(["group", "create", "--slug", "cats", "--title", "Again"])
        .assert()
        .failure();

    yatube(&url)
        .args(["group", "delete", "cats"])
        .assert()
        .success();

    yatube(&url)
        .args(["group", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cats").not());
}

#[test]
fn test_invalid_slug_fails() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("yatube.db").display());

    yatube(&url)
        .args(["group", "create", "--slug", "no spaces", "--title", "Bad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid slug"));
}

#[test]
fn test_delete_unknown_user_fails() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("yatube.db").display());

    yatube(&url)
        .args(["user", "delete", "ghost"])
        .assert()
        .failure();
}

// === Config Command Tests ===

#[test]
fn test_config_show_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "posts_per_page = 7\n").unwrap();

    yatube("sqlite://unused.db")
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("posts_per_page = 7"))
        .stdout(predicate::str::contains("database_url = \"sqlite://unused.db\""));
}

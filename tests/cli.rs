//! CLI smoke tests for the pmem binary

use assert_cmd::Command;
use predicates::prelude::*;

/// Fresh command wired to an isolated database under `dir`
fn pmem(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pmem").unwrap();
    cmd.env("PMEM_DATABASE", dir.path().join("memory.db"))
        .env("PMEM_CONFIG", dir.path().join("config.toml"));
    cmd
}

#[test]
fn init_create_update_context() {
    let dir = tempfile::tempdir().unwrap();

    pmem(&dir)
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));

    pmem(&dir)
        .args(["create", "api-service", "--path", "/workspace/api", "--tech", "Rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project created: api-service"));

    pmem(&dir)
        .args(["update", "api-service", "todo", "- [ ] ship the thing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated to v2"));

    pmem(&dir)
        .args(["context", "api-service"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Project: api-service"))
        .stdout(predicate::str::contains("ship the thing"));

    pmem(&dir)
        .args(["search", "ship"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api-service"));

    pmem(&dir)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api-service"));
}

#[test]
fn commands_require_initialized_database() {
    let dir = tempfile::tempdir().unwrap();

    pmem(&dir)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pmem init"));
}

#[test]
fn invalid_doc_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    pmem(&dir).args(["init"]).assert().success();
    pmem(&dir)
        .args(["create", "api", "--path", "/tmp/api"])
        .assert()
        .success();

    pmem(&dir)
        .args(["update", "api", "journal", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid doc type"));
}

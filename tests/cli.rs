//! Command-line integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn logic64() -> Command {
    let mut cmd = Command::cargo_bin("logic64").unwrap_or_else(|_| unreachable!());
    cmd.env_remove("LOGIC64_DOCS_ROOT")
        .env_remove("LOGIC64_RULES_PATH")
        .env_remove("LOGIC64_GOVERNANCE_MODE")
        .env_remove("LOGIC64_KEEP_ALIVE_SECS");
    cmd
}

#[test]
fn test_resolve_forbidden_intent() {
    logic64()
        .args(["resolve", "build an api with express"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "REJECTED: Forbidden technology 'Express' requested.",
        ));
}

#[test]
fn test_resolve_matched_json() {
    logic64()
        .args(["--format", "json", "resolve", "add a migration"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"MATCHED\""))
        .stdout(predicate::str::contains("Database"));
}

#[test]
fn test_verify_stdin_rejects_forbidden_import() {
    logic64()
        .args(["verify", "-"])
        .write_stdin("import mongoose from 'mongodb';\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("REJECTED"));
}

#[test]
fn test_verify_clean_file() {
    let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
    let file = dir.path().join("page.tsx");
    std::fs::write(&file, "export default function Page() { return <main className=\"p-4\" /> }")
        .unwrap_or_else(|_| unreachable!());

    logic64()
        .arg("verify")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("APPROVED"));
}

#[test]
fn test_check_strict_fails_without_documents() {
    let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
    logic64()
        .arg("--docs-root")
        .arg(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("system/contract.md"));
}

#[test]
fn test_serve_strict_refuses_to_start_without_documents() {
    let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
    logic64()
        .arg("--docs-root")
        .arg(dir.path())
        .args(["serve", "stdio"])
        .assert()
        .failure();
}

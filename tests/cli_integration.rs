//! Integration tests for the CredVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords are supplied through `CREDVAULT_PASSWORD` /
//! `CREDVAULT_NEW_PASSWORD` so nothing prompts, and every test writes a
//! `credvault.toml` with cheap Argon2 settings into its own temp dir.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "integration-pass";
const NEW_PASSWORD: &str = "rotated-pass-123";

/// Helper: get a Command pointing at the credvault binary.
fn credvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("credvault").expect("binary should exist")
}

/// Helper: a temp config dir with fast KDF settings.
fn config_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("credvault.toml")
        .write_str("argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n")
        .unwrap();
    tmp
}

/// Helper: a command bound to `dir` with the given master password.
fn cmd(dir: &TempDir, password: &str) -> Command {
    let mut c = credvault();
    c.arg("--config-dir")
        .arg(dir.path())
        .env("CREDVAULT_PASSWORD", password)
        .env_remove("CREDVAULT_NEW_PASSWORD")
        .env_remove("RUST_LOG");
    c
}

/// Helper: a configured vault.
fn setup_vault() -> TempDir {
    let dir = config_dir();
    cmd(&dir, PASSWORD).arg("setup").assert().success();
    dir
}

// ---------------------------------------------------------------------------
// Static behaviour
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    credvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted credential vault"))
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("change-password"));
}

#[test]
fn version_flag_shows_version() {
    credvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("credvault"));
}

#[test]
fn no_args_shows_help() {
    credvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn completions_generate_script() {
    credvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("credvault"));
}

#[test]
fn completions_reject_unknown_shell() {
    credvault()
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ---------------------------------------------------------------------------
// Setup and status
// ---------------------------------------------------------------------------

#[test]
fn status_without_database_suggests_setup() {
    let dir = config_dir();
    cmd(&dir, PASSWORD)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No vault"));
    dir.child("credvault.db").assert(predicate::path::missing());
}

#[test]
fn setup_creates_database_and_reports_configured() {
    let dir = setup_vault();
    dir.child("credvault.db").assert(predicate::path::exists());

    cmd(&dir, PASSWORD)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Master password configured"))
        .stdout(predicate::str::contains("State:").not());
}

#[test]
fn lowered_kdf_memory_is_logged_as_warning() {
    let dir = setup_vault();
    cmd(&dir, PASSWORD)
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("argon2 memory cost is below the recommended level"));
}

#[test]
fn second_setup_fails() {
    let dir = setup_vault();
    cmd(&dir, "some-other-password")
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already configured"));
}

#[test]
fn setup_rejects_short_password() {
    let dir = config_dir();
    cmd(&dir, "short")
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));
}

#[test]
fn get_before_setup_fails() {
    let dir = config_dir();
    cmd(&dir, PASSWORD)
        .args(["get", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

// ---------------------------------------------------------------------------
// Credential commands
// ---------------------------------------------------------------------------

#[test]
fn add_then_get_prints_plaintext() {
    let dir = setup_vault();

    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "3", "--label", "github", "ghp_secret123abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored credential 1"));

    cmd(&dir, PASSWORD)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout("ghp_secret123abc\n");
}

#[test]
fn add_reads_piped_value() {
    let dir = setup_vault();

    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "1", "--label", "piped", "--auth-type", "ssh_key"])
        .write_stdin("piped-secret\n")
        .assert()
        .success();

    cmd(&dir, PASSWORD)
        .args(["get", "1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"auth_data\": \"piped-secret\""))
        .stdout(predicate::str::contains("\"auth_type\": \"ssh_key\""));
}

#[test]
fn get_with_wrong_password_fails() {
    let dir = setup_vault();
    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "1", "--label", "gh", "value"])
        .assert()
        .success();

    cmd(&dir, "wrong-password")
        .args(["get", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master password"));
}

#[test]
fn list_json_hides_payloads() {
    let dir = setup_vault();
    for (provider, label) in [("1", "alpha"), ("2", "beta"), ("1", "gamma")] {
        cmd(&dir, PASSWORD)
            .args(["add", "--provider", provider, "--label", label, "payload-value"])
            .assert()
            .success();
    }

    cmd(&dir, PASSWORD)
        .args(["list", "--json", "--provider", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("gamma"))
        .stdout(predicate::str::contains("beta").not())
        .stdout(predicate::str::contains("payload-value").not());
}

#[test]
fn update_changes_label_and_payload() {
    let dir = setup_vault();
    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "1", "--label", "old", "old-value"])
        .assert()
        .success();

    cmd(&dir, PASSWORD)
        .args(["update", "1", "--label", "new", "new-value"])
        .assert()
        .success();

    cmd(&dir, PASSWORD)
        .args(["get", "1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"new\""))
        .stdout(predicate::str::contains("\"auth_data\": \"new-value\""));
}

#[test]
fn update_reads_new_payload_from_stdin() {
    let dir = setup_vault();
    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "1", "--label", "gh", "old-value"])
        .assert()
        .success();

    cmd(&dir, PASSWORD)
        .args(["update", "1", "--read-value"])
        .write_stdin("from-stdin\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("shell history").not());

    cmd(&dir, PASSWORD)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-stdin"))
        .stdout(predicate::str::contains("old-value").not());
}

#[test]
fn update_without_changes_fails_before_unlocking() {
    let dir = setup_vault();
    cmd(&dir, "not-the-password")
        .args(["update", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn delete_needs_no_password() {
    let dir = setup_vault();
    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "1", "--label", "gh", "value"])
        .assert()
        .success();

    cmd(&dir, "not-the-password")
        .args(["delete", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted credential 1"));

    cmd(&dir, PASSWORD)
        .args(["get", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

#[test]
fn change_password_reencrypts_credentials() {
    let dir = setup_vault();
    cmd(&dir, PASSWORD)
        .args(["add", "--provider", "1", "--label", "gh", "survives-rotation"])
        .assert()
        .success();

    cmd(&dir, PASSWORD)
        .env("CREDVAULT_NEW_PASSWORD", NEW_PASSWORD)
        .arg("change-password")
        .assert()
        .success();

    cmd(&dir, NEW_PASSWORD)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout("survives-rotation\n");

    cmd(&dir, PASSWORD)
        .args(["get", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master password"));
}

#[test]
fn change_password_with_wrong_current_password_fails() {
    let dir = setup_vault();

    cmd(&dir, "wrong-password")
        .env("CREDVAULT_NEW_PASSWORD", NEW_PASSWORD)
        .arg("change-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("don't match"));

    cmd(&dir, PASSWORD).arg("status").assert().success();
}

//! Integration tests for the hashcrack CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SHA256_TEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
const SHA256_ZZZ: &str = "17f165d5a5ba695f27c023a83aa2b3463e23810e360b7517127e90161eebabda";

fn hashcrack(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hashcrack").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write_candidates(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("candidates.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn read_report(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let temp_dir = TempDir::new().unwrap();
    hashcrack(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("hash"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let temp_dir = TempDir::new().unwrap();
    hashcrack(temp_dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hashcrack"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    let temp_dir = TempDir::new().unwrap();
    hashcrack(temp_dir.path())
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_hash_command_prints_digest() {
    let temp_dir = TempDir::new().unwrap();
    hashcrack(temp_dir.path())
        .args(["hash", "test", "--algorithm", "SHA256"])
        .assert()
        .success()
        .stdout(predicate::str::contains(SHA256_TEST));
}

#[test]
fn test_hash_command_pbkdf2_requires_salt() {
    let temp_dir = TempDir::new().unwrap();
    hashcrack(temp_dir.path())
        .args(["hash", "test", "--algorithm", "PBKDF2"])
        .assert()
        .code(2);

    hashcrack(temp_dir.path())
        .args([
            "hash",
            "password",
            "--algorithm",
            "PBKDF2",
            "--salt",
            "73616c74",
            "--iterations",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b",
        ));
}

/// A PBKDF2 target printed by `hash` is found by `run` with the same flags
#[test]
fn test_hash_then_run_pbkdf2() {
    let temp_dir = TempDir::new().unwrap();
    let pbkdf2 = ["--algorithm", "PBKDF2", "--salt", "73616c74", "--iterations", "1"];

    let hashed = hashcrack(temp_dir.path())
        .args(["hash", "password"])
        .args(pbkdf2)
        .output()
        .unwrap();
    assert!(hashed.status.success());
    let target = String::from_utf8(hashed.stdout).unwrap().trim().to_string();

    let input = write_candidates(temp_dir.path(), &["letmein", "password", "hunter2"]);
    let report = temp_dir.path().join("results.json");

    hashcrack(temp_dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .args(["--target", &target, "--workers", "2"])
        .args(pbkdf2)
        .arg("--output")
        .arg(&report)
        .assert()
        .success();

    let json = read_report(&report);
    assert_eq!(json["total_matches"], 1);
    assert_eq!(json["matches"][0]["original"], "password");
}

/// An explicit salt length is enforced the same way by both commands
#[test]
fn test_salt_length_applies_to_hash_and_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_candidates(temp_dir.path(), &["password"]);
    let target = "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b";
    let pbkdf2 = ["--algorithm", "PBKDF2", "--salt", "73616c74", "--iterations", "1"];

    hashcrack(temp_dir.path())
        .args(["hash", "password", "--salt-length", "16"])
        .args(pbkdf2)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pbkdf2_salt_length is 16"));

    hashcrack(temp_dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .args(["--target", target, "--salt-length", "16"])
        .args(pbkdf2)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pbkdf2_salt_length is 16"));

    hashcrack(temp_dir.path())
        .args(["hash", "password", "--salt-length", "4"])
        .args(pbkdf2)
        .assert()
        .success()
        .stdout(predicate::str::contains(target));
}

/// One match among three candidates
#[test]
fn test_run_finds_single_match() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_candidates(temp_dir.path(), &["test", "hello", "world"]);
    let report = temp_dir.path().join("out").join("results.json");

    hashcrack(temp_dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .args(["--target", SHA256_TEST, "--algorithm", "SHA256", "--workers", "2"])
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("'test'"));

    let json = read_report(&report);
    assert_eq!(json["total_matches"], 1);
    assert_eq!(json["matches"][0]["original"], "test");
    assert_eq!(json["matches"][0]["hash"], SHA256_TEST);
    assert_eq!(json["total_processed"], 3);
    assert_eq!(json["success"], true);

    let log = fs::read_to_string(temp_dir.path().join("logs").join("hasher.log")).unwrap();
    assert!(log.contains("found match: 'test'"));
}

/// No match is still a successful run
#[test]
fn test_run_without_match_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_candidates(temp_dir.path(), &["a", "b"]);
    let report = temp_dir.path().join("results.json");

    hashcrack(temp_dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .args(["--target", SHA256_ZZZ, "--workers", "2"])
        .arg("--output")
        .arg(&report)
        .assert()
        .code(0);

    let json = read_report(&report);
    assert_eq!(json["total_matches"], 0);
    assert_eq!(json["matches"].as_array().unwrap().len(), 0);
}

/// Zero workers is rejected before anything runs
#[test]
fn test_zero_workers_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_candidates(temp_dir.path(), &["test"]);
    let report = temp_dir.path().join("results.json");

    hashcrack(temp_dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .args(["--target", SHA256_TEST, "--workers", "0"])
        .arg("--output")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("worker_count must be at least 1"));

    assert!(!report.exists());
}

#[test]
fn test_malformed_target_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_candidates(temp_dir.path(), &["test"]);

    hashcrack(temp_dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .args(["--target", "abc123", "--algorithm", "SHA384"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("96 hex characters"));
}

#[test]
fn test_missing_input_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    hashcrack(temp_dir.path())
        .args(["run", "--input", "nope.csv", "--target", SHA256_TEST])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope.csv"));

    assert!(!temp_dir.path().join("logs").join("results.json").exists());
}

/// Settings come from a config file and the environment
#[test]
fn test_config_file_and_env_layers() {
    let temp_dir = TempDir::new().unwrap();
    write_candidates(temp_dir.path(), &["x", "test", "y"]);
    let config_path = temp_dir.path().join("custom.yaml");
    fs::write(
        &config_path,
        format!(
            "hash:\n  target_hash: \"{SHA256_TEST}\"\ninput:\n  csv_path: candidates.csv\n"
        ),
    )
    .unwrap();

    hashcrack(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("run")
        .env("HASHCRACK_GENERAL__WORKER_COUNT", "3")
        .env("HASHCRACK_OUTPUT__RESULTS_PATH", "env-results.json")
        .assert()
        .success();

    let json = read_report(&temp_dir.path().join("env-results.json"));
    assert_eq!(json["total_matches"], 1);
    assert_eq!(json["workers"].as_array().unwrap().len(), 3);
}

#[test]
fn test_config_validate() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("hashcrack.toml"),
        format!("[hash]\ntarget_hash = \"{SHA256_TEST}\"\n\n[general]\nworker_count = 4\n"),
    )
    .unwrap();

    hashcrack(temp_dir.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));

    hashcrack(temp_dir.path())
        .args(["config", "validate"])
        .env("HASHCRACK_GENERAL__MAX_WORKERS", "0")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_workers"));
}

#[test]
fn test_config_show_formats() {
    let temp_dir = TempDir::new().unwrap();

    hashcrack(temp_dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chunk_size = 1000"));

    let output = hashcrack(temp_dir.path())
        .args(["config", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["hash"]["algorithm"], "SHA256");

    hashcrack(temp_dir.path())
        .args(["config", "show", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("log_level: info"));
}

//! CLI integration tests
//!
//! Run the built binary against temporary repositories and check output and exit codes.

mod support;

use std::process::Command;
use support::autodeploy_binary;
use tempfile::TempDir;

#[test]
fn test_cli_help() {
    let output = Command::new(autodeploy_binary())
        .arg("--help")
        .output()
        .expect("Failed to execute autodeploy");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["deploy", "detect", "generate", "health"] {
        assert!(stdout.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_detect_json() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::react_vite_node_postgres());

    let output = Command::new(autodeploy_binary())
        .args(["-q", "detect"])
        .arg(temp.path())
        .args(["--format", "json"])
        .output()
        .expect("Failed to execute autodeploy");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["frontend"]["technology"], "react-vite");
    assert_eq!(value["backend"]["technology"], "nodejs");
    assert_eq!(value["database"]["technology"], "postgres");
    assert_eq!(value["layout"]["database"], "database");
}

#[test]
fn test_detect_missing_role_fails() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::missing_database());

    let output = Command::new(autodeploy_binary())
        .args(["-q", "detect"])
        .arg(temp.path())
        .output()
        .expect("Failed to execute autodeploy");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing: database"));
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::react_vite_node_postgres());

    let output = Command::new(autodeploy_binary())
        .args(["-q", "generate"])
        .arg(temp.path())
        .arg("--dry-run")
        .output()
        .expect("Failed to execute autodeploy");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- docker-compose.yml ---"));
    assert!(stdout.contains("EXPOSE 5000"));
    assert!(!temp.path().join("docker-compose.yml").exists());
}

#[test]
fn test_generate_writes_artifacts() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::react_vite_node_postgres());

    let output = Command::new(autodeploy_binary())
        .args(["-q", "generate"])
        .arg(temp.path())
        .args(["--format", "yaml"])
        .output()
        .expect("Failed to execute autodeploy");

    assert!(output.status.success());
    assert!(temp.path().join("docker-compose.yml").is_file());
    assert!(temp.path().join("frontend/Dockerfile").is_file());
    assert!(temp.path().join("nginx.conf").is_file());
}

#[test]
fn test_deploy_rejects_non_github_reference() {
    let clone_dir = TempDir::new().unwrap();

    let output = Command::new(autodeploy_binary())
        .env("AUTODEPLOY_CLONE_DIR", clone_dir.path())
        .args(["-q", "deploy", "https://example.com/acme/shop", "--format", "json"])
        .output()
        .expect("Failed to execute autodeploy");

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "failed");
    assert_eq!(value["failed_in"], "idle");
    assert_eq!(std::fs::read_dir(clone_dir.path()).unwrap().count(), 0);
}

//! End-to-end tests of the `mg` binary that never reach a database.
//!
//! Every case fails during config loading or discovery, both of which run
//! before a connection is opened.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn mg_bin() -> String {
    env!("CARGO_BIN_EXE_mg").to_string()
}

fn write_project(dir: &Path, files: &[(&str, &str)]) -> String {
    let sql = dir.join("sql");
    fs::create_dir_all(&sql).unwrap();
    for (name, body) in files {
        fs::write(sql.join(name), body).unwrap();
    }
    let config = dir.join("migrator.yml");
    fs::write(
        &config,
        "datasources:\n  main:\n    folder: sql\n    connection: postgres://127.0.0.1:1/unreachable\n",
    )
    .unwrap();
    config.display().to_string()
}

fn mg(args: &[&str]) -> Output {
    Command::new(mg_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MG_CONFIG")
        .output()
        .expect("failed to run mg")
}

#[test]
fn test_missing_config_fails() {
    let output = mg(&["run", "--config", "/no/such/dir/migrator.yml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[C006]"), "stderr: {stderr}");
}

#[test]
fn test_duplicate_identifier_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[
            ("001_users.sql", "CREATE TABLE users (id int);"),
            ("001_orders.sql", "CREATE TABLE orders (id int);"),
        ],
    );

    let output = mg(&["run", "--config", &config]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Found two migrations with same id: 1"),
        "stderr: {stderr}"
    );
    assert!(!stderr.contains("Connecting to"), "stderr: {stderr}");
}

#[test]
fn test_file_without_identifier_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(dir.path(), &[("users.sql", "CREATE TABLE users (id int);")]);

    let output = mg(&["status", "--config", &config]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[C001]"), "stderr: {stderr}");
}

#[test]
fn test_unknown_datasource_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(dir.path(), &[]);

    let output = mg(&["run", "--config", &config, "--datasource", "other"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Available: main"), "stderr: {stderr}");
}

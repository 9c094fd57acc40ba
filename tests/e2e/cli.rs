//! Tests for the impala-refresher binary

use super::fixtures::fake_impala_shell;
use super::helpers::{run_refresher, write_script};
use serial_test::serial;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn setup() -> (TempDir, String) {
    let temp = TempDir::new().unwrap();
    let shell = write_script(temp.path(), "impala-shell", &fake_impala_shell()).unwrap();
    let shell = shell.display().to_string();
    (temp, shell)
}

#[test]
#[serial]
fn test_all_nodes_refreshed() {
    let (_temp, shell) = setup();
    let output = run_refresher(&[
        "--impala-shell",
        &shell,
        "sales.orders",
        "node-01",
        "node-02",
        "node-03",
    ])
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("Refreshing node-01's metadata..."));
    assert!(stdout.contains("node-02 refreshed successfully! Took:"));
    assert!(stdout.contains("All 3 node(s) refreshed"));
}

#[test]
#[serial]
fn test_failed_and_unconfirmed_nodes_fail_the_run() {
    let (_temp, shell) = setup();
    let output = run_refresher(&[
        "--impala-shell",
        &shell,
        "orders",
        "node-01",
        "bad-02",
        "quiet-03",
    ])
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("node-01 refreshed successfully!"));
    assert!(stdout.contains("bad-02 failed to refresh"));
    assert!(stdout.contains("AnalysisException"));
    assert!(stdout.contains("quiet-03 did not confirm completion"));
    assert!(stdout.contains("2 of 3 node(s) failed to refresh"));
}

#[test]
#[serial]
fn test_slow_node_times_out() {
    let (_temp, shell) = setup();
    let started = Instant::now();
    let output = run_refresher(&[
        "--impala-shell",
        &shell,
        "--timeout",
        "1",
        "--max-parallel",
        "2",
        "orders",
        "node-01",
        "slow-02",
        "node-03",
    ])
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Node slow-02 timed out!"));
    assert!(stdout.contains("node-03 refreshed successfully!"));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
#[serial]
fn test_config_file_supplies_table_and_nodes() {
    let (temp, shell) = setup();
    let config = temp.path().join("refresh.toml");
    std::fs::write(
        &config,
        format!(
            "table = \"orders\"\nnodes = [\"node-01\", \"node-02\"]\nimpala_shell = \"{shell}\"\n\n[run]\ntimeout_secs = 5\nmax_parallel = 1\n"
        ),
    )
    .unwrap();

    let output = run_refresher(&["--config", &config.display().to_string()]).unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("All 2 node(s) refreshed"));
}

#[test]
#[serial]
fn test_missing_impala_shell() {
    let output = run_refresher(&[
        "--impala-shell",
        "impala-shell-missing-for-test",
        "orders",
        "node-01",
    ])
    .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("Impala shell (impala-shell-missing-for-test) is required!"));
}

#[test]
#[serial]
fn test_missing_nodes_is_an_error() {
    let (_temp, shell) = setup();
    let output = run_refresher(&["--impala-shell", &shell, "orders"]).unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("No nodes given"));
}

#[test]
#[serial]
fn test_invalid_table_rejected_by_argument_parser() {
    let output = run_refresher(&["orders; DROP TABLE orders", "node-01"]).unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Table name"));
}

//! CLI binary smoke tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("machinelearner").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"));
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_prints_namespaces_in_search_order() {
    let output = cmd().arg("list").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let namespaces: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split(':').next())
        .collect();
    assert_eq!(namespaces.first(), Some(&"linear_model"));
    assert_eq!(namespaces.last(), Some(&"kernel_ridge"));
    assert!(text.contains("neural_network: (empty)"));
    assert!(text.contains("LinearRegression"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_without_config_errors() {
    cmd().arg("run").assert().failure();
}

#[test]
fn run_writes_predictions_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let train = dir.path().join("train.tsv");
    let mut body = String::from("x\ttarget\n");
    for i in 0..8 {
        body.push_str(&format!("{}\t{}\n", i, 3 * i));
    }
    std::fs::write(&train, body).unwrap();
    let config = dir.path().join("run.json");
    std::fs::write(&config, r#"{"model": {"model_type": "LinearRegression"}}"#).unwrap();

    cmd()
        .args([
            "run",
            config.to_str().unwrap(),
            "-d",
            train.to_str().unwrap(),
            "--test-size",
            "0.25",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("row\tprediction\ttarget"));
}

#[test]
fn run_with_unknown_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    let train = dir.path().join("train.csv");
    std::fs::write(&train, "x,target\n1,1\n2,2\n3,3\n4,4\n").unwrap();
    let config = dir.path().join("run.json");
    std::fs::write(&config, "{}").unwrap();

    cmd()
        .args([
            "run",
            config.to_str().unwrap(),
            "-d",
            train.to_str().unwrap(),
            "-m",
            "NoSuchModel",
        ])
        .assert()
        .failure();
}

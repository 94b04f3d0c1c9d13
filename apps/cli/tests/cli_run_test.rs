//! CLI smoke tests for the `kiln` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn kiln() -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    // Tests must not pick up operator configuration from the environment.
    for (var, _) in std::env::vars() {
        if var.starts_with("KILN_") {
            cmd.env_remove(&var);
        }
    }
    cmd
}

#[test]
fn help_lists_the_run_command() {
    kiln()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("fine-tuning"));
}

#[test]
fn no_command_prints_help_and_succeeds() {
    kiln().assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn run_without_configuration_names_the_missing_setting() {
    let dir = tempfile::tempdir().unwrap();
    kiln()
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("endpoint"))
        .stderr(predicate::str::contains("KILN_ENDPOINT"));
}

#[test]
fn run_with_unreadable_config_file_fails() {
    kiln()
        .args(["run", "--config", "/definitely/not/here/kiln.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file"));
}

#[test]
fn run_reports_partial_configuration() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("kiln.toml"),
        "endpoint = \"https://res.openai.azure.com\"\napi_key = \"key-1\"\n",
    )
    .unwrap();

    kiln()
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("subscription_id"));
}

mod common;

use bep_pcb_check::check::CheckSummary;
use bep_pcb_check::cli::{run_driver, Driver, ExitStatus};
use bep_pcb_check::options::CheckOptions;
use bep_pcb_check::{bep_pcb_check, CheckError};
use common::*;
use std::process::Command;

struct FailingDriver;

impl Driver for FailingDriver {
    fn run(&self, _opts: &CheckOptions) -> Result<CheckSummary, CheckError> {
        Err(CheckError::Failed("boom".to_string()))
    }
}

fn options(traceback: bool) -> CheckOptions {
    let mut opts = CheckOptions::new("out", "spec.json");
    opts.traceback = traceback;
    opts
}

#[test]
fn test_failure_without_traceback_prints_one_line() {
    let mut stderr = Vec::new();
    let outcome = run_driver(&FailingDriver, &options(false), &mut stderr).unwrap();

    assert_eq!(outcome.status, ExitStatus::Failure);
    assert_eq!(outcome.status.code(), 1);
    assert!(outcome.summary.is_none());
    assert_eq!(String::from_utf8(stderr).unwrap(), "ERROR: boom\n");
}

#[test]
fn test_failure_with_traceback_is_returned() {
    let mut stderr = Vec::new();
    let err = run_driver(&FailingDriver, &options(true), &mut stderr).unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert!(stderr.is_empty());
}

#[test]
fn test_driver_as_trait_object() {
    let driver: Box<dyn Driver> = Box::new(FailingDriver);
    let mut stderr = Vec::new();
    let outcome = run_driver(driver.as_ref(), &options(false), &mut stderr).unwrap();

    assert_eq!(outcome.status, ExitStatus::Failure);
}

#[test]
fn test_missing_inputs_fail_cleanly() {
    let mut stderr = Vec::new();
    let outcome = run_driver(&bep_pcb_check(), &options(false), &mut stderr).unwrap();

    assert_eq!(outcome.status, ExitStatus::Failure);
    let message = String::from_utf8(stderr).unwrap();
    assert!(message.starts_with("ERROR: "));
    assert_eq!(message.lines().count(), 1);
}

#[test]
fn test_successful_run_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("spec.json");
    let states_path = dir.path().join("states.json");
    write_json(&spec_path, &test_spec());
    write_json(&states_path, &constant_states(T0, T0 + DAY, 2));

    let mut opts = CheckOptions::new(dir.path().join("out"), &spec_path);
    opts.states = Some(states_path);
    let mut stderr = Vec::new();
    let outcome = run_driver(&bep_pcb_check(), &opts, &mut stderr).unwrap();

    assert_eq!(outcome.status, ExitStatus::Success);
    assert_eq!(outcome.status.code(), 0);
    assert!(outcome.summary.is_some());
    assert!(stderr.is_empty());
}

#[test]
fn test_binary_exits_with_status_one_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_bep_pcb_check"))
        .arg("--outdir")
        .arg(dir.path().join("out"))
        .arg("--verbose")
        .arg("0")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.lines().any(|l| l.starts_with("ERROR: ")));
}

#[test]
fn test_binary_traceback_surfaces_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_bep_pcb_check"))
        .arg("--outdir")
        .arg(dir.path().join("out"))
        .arg("--traceback")
        .arg("--verbose")
        .arg("0")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.lines().any(|l| l.starts_with("ERROR: ")));
    assert!(stderr.contains("NoInputs"));
}

mod common;

use bep_pcb_check::limits::{validation_limits, HIST_LIMIT};
use bep_pcb_check::regression::*;
use bep_pcb_check::{calc_model, model_path, Signal, MSID_KEY};
use common::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tester(model_path: &Path) -> RegressionTester {
    RegressionTester::new(
        MSID_KEY,
        Signal::BepPcb,
        model_path,
        validation_limits,
        &HIST_LIMIT,
        calc_model,
    )
}

/// Model directory with one load carrying history and telemetry and one
/// carrying states only.
fn model_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_json(&root.join("bep_pcb_model_spec.json"), &test_spec());

    let with_history = root.join("loads").join("MAR0124A");
    write_json(&with_history.join("history.json"), &constant_states(T0, T0 + 5.0 * DAY, 5));
    write_json(&with_history.join("states.json"), &constant_states(T0 + 5.0 * DAY, T0 + 7.0 * DAY, 4));
    let times: Vec<f64> = (0..=120).map(|i| T0 + f64::from(i) * 3600.0).collect();
    let temps: Vec<f64> = times.iter().map(|t| 30.0 + (t - T0) / DAY).collect();
    write_json(
        &with_history.join("telemetry.json"),
        &telemetry_json(vec![("tmp_bep_pcb", times, temps)]),
    );

    let states_only = root.join("loads").join("FEB2624B");
    write_json(&states_only.join("states.json"), &constant_states(T0, T0 + 2.0 * DAY, 2));

    dir
}

fn stored_times(root: &Path, load: &str) -> Vec<f64> {
    let path = root.join(ANSWERS_DIR).join(load).join("prediction.json");
    let answer: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    answer["times"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn test_tester_construction_does_not_fail() {
    let tester = tester(&model_path());

    assert!(tester.loads_dir().ends_with(LOADS_DIR));
    assert!(tester.answers_dir().ends_with(ANSWERS_DIR));
}

#[test]
fn test_all_loads_are_sorted() {
    let dir = model_dir();
    let loads = tester(dir.path()).all_loads().unwrap();

    assert_eq!(loads, ["FEB2624B", "MAR0124A"]);
}

#[test]
fn test_missing_loads_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut tester = tester(dir.path());

    assert!(matches!(tester.run_models(StateBuilder::Load), Err(RegressionError::Io { .. })));
}

#[test]
fn test_store_then_compare_answers() {
    let dir = model_dir();
    let mut tester = tester(dir.path());
    tester.run_models(StateBuilder::Load).unwrap();

    for load in ["FEB2624B", "MAR0124A"] {
        tester.run_test(TestKind::Prediction, true, load).unwrap();
        tester.run_test(TestKind::Prediction, false, load).unwrap();
    }
    tester.run_test(TestKind::Validation, true, "MAR0124A").unwrap();
    tester.run_test(TestKind::Validation, false, "MAR0124A").unwrap();

    assert!(dir.path().join(OUTPUT_DIR).join("MAR0124A").join("index.json").is_file());
}

#[test]
fn test_load_without_telemetry_has_no_validation() {
    let dir = model_dir();
    let mut tester = tester(dir.path());
    tester.run_models(StateBuilder::Load).unwrap();

    let err = tester.run_test(TestKind::Validation, true, "FEB2624B").unwrap_err();
    assert!(matches!(err, RegressionError::MissingOutput { kind: TestKind::Validation, .. }));
}

#[test]
fn test_changed_answer_is_a_mismatch() {
    let dir = model_dir();
    let mut tester = tester(dir.path());
    tester.run_models(StateBuilder::Load).unwrap();
    tester.run_test(TestKind::Prediction, true, "FEB2624B").unwrap();

    let path = dir.path().join(ANSWERS_DIR).join("FEB2624B").join("prediction.json");
    let mut answer: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    answer["temps"][3] = serde_json::json!(answer["temps"][3].as_f64().unwrap() + 0.5);
    fs::write(&path, answer.to_string()).unwrap();

    match tester.run_test(TestKind::Prediction, false, "FEB2624B").unwrap_err() {
        RegressionError::Mismatch { what, .. } => assert_eq!(what, "temp[3]"),
        other => panic!("expected a mismatch, got {other:?}"),
    }
}

#[test]
fn test_compare_without_answer_fails() {
    let dir = model_dir();
    let mut tester = tester(dir.path());
    tester.run_models(StateBuilder::Load).unwrap();

    let err = tester.run_test(TestKind::Prediction, false, "FEB2624B").unwrap_err();
    assert!(matches!(err, RegressionError::Io { .. }));
}

#[test]
fn test_run_test_before_run_models_fails() {
    let dir = model_dir();
    let tester = tester(dir.path());

    let err = tester.run_test(TestKind::Prediction, true, "FEB2624B").unwrap_err();
    assert!(matches!(err, RegressionError::MissingOutput { .. }));
}

#[test]
fn test_continuity_starts_at_history() {
    let dir = model_dir();

    let mut load = tester(dir.path());
    load.run_models(StateBuilder::Load).unwrap();
    load.run_test(TestKind::Prediction, true, "MAR0124A").unwrap();
    assert_eq!(stored_times(dir.path(), "MAR0124A").first(), Some(&(T0 + 5.0 * DAY)));

    let mut continuity = tester(dir.path());
    continuity.run_models(StateBuilder::Continuity).unwrap();
    continuity.run_test(TestKind::Prediction, true, "MAR0124A").unwrap();
    let times = stored_times(dir.path(), "MAR0124A");
    assert_eq!(times.first(), Some(&T0));
    assert_eq!(times.last(), Some(&(T0 + 7.0 * DAY)));
}

#[test]
fn test_reordered_validation_answer_is_a_mismatch() {
    let dir = model_dir();
    let mut tester = tester(dir.path());
    tester.run_models(StateBuilder::Load).unwrap();
    tester.run_test(TestKind::Validation, true, "MAR0124A").unwrap();

    let path = dir.path().join(ANSWERS_DIR).join("MAR0124A").join("validation.json");
    let mut answer: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    answer.as_array_mut().unwrap().swap(0, 1);
    fs::write(&path, answer.to_string()).unwrap();

    match tester.run_test(TestKind::Validation, false, "MAR0124A").unwrap_err() {
        RegressionError::LabelMismatch { expected, actual, .. } => {
            assert_eq!(expected, "TMP_BEP_PCB 50%");
            assert_eq!(actual, "TMP_BEP_PCB 1%");
        }
        other => panic!("expected a label mismatch, got {other:?}"),
    }
}

mod common;

use approx::assert_abs_diff_eq;
use bep_pcb_check::calc_model;
use bep_pcb_check::check::prediction::predict;
use bep_pcb_check::model::{ComponentName, ModelError, ModelStage};
use bep_pcb_check::states::StatesTable;
use common::*;

#[test]
fn test_model_covers_requested_window() {
    let states = constant_states(T0, T0 + 2.0 * DAY, 4);
    let model = calc_model(&test_spec(), &states, T0, T0 + DAY, None).unwrap();

    assert_eq!(model.time_bounds(), (T0, T0 + DAY));
    assert_eq!(model.times().first(), Some(&T0));
    assert_eq!(model.times().last(), Some(&(T0 + DAY)));
    assert_eq!(model.prediction().len(), model.times().len());
    assert_eq!(model.stage(), ModelStage::Calculated);
}

#[test]
fn test_model_starts_from_spec_temperature_without_telemetry() {
    let states = constant_states(T0, T0 + DAY, 1);
    let model = calc_model(&test_spec(), &states, T0, T0 + DAY, None).unwrap();

    assert_eq!(model.init_temp(), 30.0);
    assert_eq!(model.prediction()[0], 30.0);
}

#[test]
fn test_telemetry_seeds_initial_temperature() {
    let states = constant_states(T0, T0 + DAY, 1);
    let telemetry = series(vec![T0 - 1000.0, T0 + 1000.0], vec![30.0, 32.0]);
    let model = calc_model(&test_spec(), &states, T0, T0 + DAY, Some(&telemetry)).unwrap();

    assert_abs_diff_eq!(model.init_temp(), 31.0, epsilon = 1e-12);
    assert_abs_diff_eq!(model.prediction()[0], 31.0, epsilon = 1e-12);
}

#[test]
fn test_constant_inputs_converge_to_equilibrium() {
    let states = constant_states(T0, T0 + 2.0 * DAY, 3);
    let model = calc_model(&test_spec(), &states, T0, T0 + 2.0 * DAY, None).unwrap();
    let temps = model.prediction();

    assert!(temps.windows(2).all(|w| w[1] >= w[0]));
    assert_abs_diff_eq!(temps[temps.len() - 1], T_EQ, epsilon = 1e-9);
    assert_abs_diff_eq!(model.equilibrium(0), T_EQ, epsilon = 1e-12);
}

#[test]
fn test_single_step_is_exact_exponential() {
    let states = constant_states(T0, T0 + DAY, 1);
    let model = calc_model(&test_spec(), &states, T0, T0 + DAY, None).unwrap();

    let expected = T_EQ + (30.0 - T_EQ) * (-328.0_f64 / 1000.0).exp();
    assert_abs_diff_eq!(model.prediction()[1], expected, epsilon = 1e-12);
}

#[test]
fn test_hrc_in_focal_plane_adds_bias() {
    let mut record = state(T0, T0 + 2.0 * DAY);
    record.simpos = -99_616.0;
    let states = StatesTable::new(vec![record]).unwrap();
    let model = calc_model(&test_spec(), &states, T0, T0 + 2.0 * DAY, None).unwrap();

    assert_abs_diff_eq!(model.equilibrium(0), T_EQ - 1.0, epsilon = 1e-12);
}

#[test]
fn test_state_gap_is_reported() {
    let states = StatesTable::new(vec![state(T0, T0 + 10_000.0), state(T0 + 20_000.0, T0 + DAY)]).unwrap();
    let err = calc_model(&test_spec(), &states, T0, T0 + DAY, None).unwrap_err();

    match err {
        ModelError::StateGap { time, .. } => assert_eq!(time, T0 + 10_000.0),
        other => panic!("expected a state gap, got {other:?}"),
    }
}

#[test]
fn test_gap_shorter_than_step_is_reported() {
    let states = StatesTable::new(vec![state(T0, T0 + 400.0), state(T0 + 500.0, T0 + 1000.0)]).unwrap();
    let err = calc_model(&test_spec(), &states, T0, T0 + 1000.0, None).unwrap_err();

    assert!(matches!(err, ModelError::StateGap { time, .. } if time == T0 + 400.0));
}

#[test]
fn test_gap_starting_on_grid_point_is_reported() {
    let states = StatesTable::new(vec![state(T0, T0 + 328.0), state(T0 + 656.0, T0 + 1000.0)]).unwrap();
    let err = calc_model(&test_spec(), &states, T0, T0 + 1000.0, None).unwrap_err();

    assert!(matches!(err, ModelError::StateGap { time, .. } if time == T0 + 328.0));
}

#[test]
fn test_states_joining_on_grid_points_are_accepted() {
    let states = StatesTable::new(vec![state(T0, T0 + 328.0), state(T0 + 328.0, T0 + 1000.0)]).unwrap();
    let model = calc_model(&test_spec(), &states, T0, T0 + 1000.0, None).unwrap();

    assert_eq!(model.times().last(), Some(&(T0 + 1000.0)));
}

#[test]
fn test_window_outside_states_is_reported() {
    let states = constant_states(T0, T0 + DAY, 2);
    let err = calc_model(&test_spec(), &states, T0 + DAY, T0 + 2.0 * DAY, None).unwrap_err();

    assert!(matches!(err, ModelError::StateGap { .. }));
}

#[test]
fn test_undeclared_component_is_rejected() {
    let mut spec = test_spec();
    spec.comps.retain(|&c| c != ComponentName::Roll);
    let states = constant_states(T0, T0 + DAY, 1);

    let err = calc_model(&spec, &states, T0, T0 + DAY, None).unwrap_err();
    assert!(matches!(err, ModelError::UnknownComponent(ComponentName::Roll)));
}

#[test]
fn test_empty_window_is_rejected() {
    let states = constant_states(T0, T0 + DAY, 1);
    let err = calc_model(&test_spec(), &states, T0 + 100.0, T0 + 100.0, None).unwrap_err();

    assert!(matches!(err, ModelError::InvalidWindow { .. }));
}

#[test]
fn test_predict_honours_run_start_and_initial_temperature() {
    let states = constant_states(T0, T0 + 3.0 * DAY, 3);
    let model = predict(calc_model, &test_spec(), &states, None, Some(T0 + DAY), Some(35.0)).unwrap();

    assert_eq!(model.time_bounds(), (T0 + DAY, T0 + 3.0 * DAY));
    assert_eq!(model.init_temp(), 35.0);
}

#[test]
fn test_predict_clamps_early_run_start_to_states() {
    let states = constant_states(T0, T0 + DAY, 1);
    let model = predict(calc_model, &test_spec(), &states, None, Some(T0 - DAY), None).unwrap();

    assert_eq!(model.time_bounds(), (T0, T0 + DAY));
}

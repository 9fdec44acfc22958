//! Model builder for the BEP PCB model.

use crate::model::{ComponentData, ComponentName, ModelError, ModelSpec, ThermalModel};
use crate::roll::calc_off_nom_rolls;
use crate::states::{StateKey, StatesTable};
use crate::telemetry::TelemetrySeries;
use tracing::debug;

/// Signature shared by model builders handed to the check driver and the
/// regression harness.
pub type ModelBuilder = fn(
    &ModelSpec,
    &StatesTable,
    f64,
    f64,
    Option<&TelemetrySeries>,
) -> Result<ThermalModel, ModelError>;

const STATE_INPUTS: [(ComponentName, StateKey); 5] = [
    (ComponentName::CcdCount, StateKey::CcdCount),
    (ComponentName::FepCount, StateKey::FepCount),
    (ComponentName::VidBoard, StateKey::VidBoard),
    (ComponentName::Clocking, StateKey::Clocking),
    (ComponentName::Pitch, StateKey::Pitch),
];

fn state_data(states: &StatesTable, values: Vec<f64>) -> ComponentData {
    ComponentData::States {
        values,
        tstart: states.tstarts(),
        tstop: states.tstops(),
    }
}

/// Builds and solves the BEP PCB model over `[start, stop]`.
///
/// `tmp_bep_pcb` telemetry, when given, seeds the initial temperature.
/// Engine errors, including states that leave a gap in the window,
/// propagate unchanged.
pub fn calc_model(
    model_spec: &ModelSpec,
    states: &StatesTable,
    start: f64,
    stop: f64,
    t_bep: Option<&TelemetrySeries>,
) -> Result<ThermalModel, ModelError> {
    let mut model = ThermalModel::new("bep_pcb", start, stop, model_spec)?;

    model.set_data(ComponentName::SimZ, state_data(states, states.column(StateKey::Simpos)))?;
    model.set_data(ComponentName::Eclipse, ComponentData::Flag(false))?;
    let node_data = match t_bep {
        Some(series) => ComponentData::Series {
            values: series.vals().to_vec(),
            times: series.times().to_vec(),
        },
        None => ComponentData::Absent,
    };
    model.set_data(ComponentName::TmpBepPcb, node_data)?;
    model.set_data(ComponentName::Roll, state_data(states, calc_off_nom_rolls(states)))?;
    for (comp, key) in STATE_INPUTS {
        model.set_data(comp, state_data(states, states.column(key)))?;
    }

    model.make()?;
    model.calc()?;

    debug!(
        "Calculated {} over {:.0}-{:.0} ({} states)",
        model.name(),
        start,
        stop,
        states.len()
    );
    Ok(model)
}

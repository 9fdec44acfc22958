//! Single-node thermal model.
//!
//! A [`ThermalModel`] goes through three stages: inputs are bound to named
//! component slots with [`ThermalModel::set_data`], [`ThermalModel::make`]
//! resolves every input onto the model time grid, and [`ThermalModel::calc`]
//! integrates the node temperature.
//!
//! The node relaxes toward an equilibrium temperature built from a sink
//! temperature plus solar, off-nominal roll and electronics terms:
//!
//! ```text
//! dT/dt = (T_eq(t) - T) / tau
//! ```
//!
//! Inputs are held constant across each step, so each step is integrated
//! exactly.

pub mod component;
pub mod spec;

pub use component::{ComponentData, ComponentName};
pub use spec::{ModelSpec, DEFAULT_DT};

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model spec {path}: {source}")]
    SpecIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model spec {path}: {source}")]
    SpecJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model spec: {0}")]
    InvalidSpec(String),

    #[error("model start {start} must be before stop {stop}")]
    InvalidWindow { start: f64, stop: f64 },

    #[error("model does not declare component '{0}'")]
    UnknownComponent(ComponentName),

    #[error("component '{comp}' has {values} values for {times} times")]
    LengthMismatch {
        comp: ComponentName,
        values: usize,
        times: usize,
    },

    #[error("component '{comp}' cannot take {kind} data")]
    UnsupportedData {
        comp: ComponentName,
        kind: &'static str,
    },

    #[error("component '{0}' has no data")]
    MissingInput(ComponentName),

    #[error("component '{comp}' has no state covering time {time}")]
    StateGap { comp: ComponentName, time: f64 },

    #[error("model must be made before calc")]
    NotMade,

    #[error("model temperature diverged at time {time}")]
    Diverged { time: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStage {
    Defined,
    Made,
    Calculated,
}

#[derive(Debug, Clone)]
pub struct ThermalModel {
    name: String,
    spec: ModelSpec,
    start: f64,
    stop: f64,
    times: Vec<f64>,
    inputs: BTreeMap<ComponentName, ComponentData>,
    resolved: BTreeMap<ComponentName, Vec<f64>>,
    init_temp: f64,
    prediction: Vec<f64>,
    stage: ModelStage,
}

impl ThermalModel {
    pub fn new(name: &str, start: f64, stop: f64, spec: &ModelSpec) -> Result<Self, ModelError> {
        if !(start < stop) {
            return Err(ModelError::InvalidWindow { start, stop });
        }
        spec.validate()?;

        let mut times = Vec::with_capacity(((stop - start) / spec.dt) as usize + 2);
        let mut step = 0u32;
        loop {
            let t = start + f64::from(step) * spec.dt;
            if t >= stop {
                break;
            }
            times.push(t);
            step += 1;
        }
        times.push(stop);

        Ok(Self {
            name: name.to_string(),
            spec: spec.clone(),
            start,
            stop,
            times,
            inputs: BTreeMap::new(),
            resolved: BTreeMap::new(),
            init_temp: spec.node.init,
            prediction: Vec::new(),
            stage: ModelStage::Defined,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn stage(&self) -> ModelStage {
        self.stage
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn time_bounds(&self) -> (f64, f64) {
        (self.start, self.stop)
    }

    /// Binds data to a declared slot. Rebinding sends the model back to the
    /// defined stage.
    pub fn set_data(&mut self, comp: ComponentName, data: ComponentData) -> Result<(), ModelError> {
        if !self.spec.declares(comp) {
            return Err(ModelError::UnknownComponent(comp));
        }

        match &data {
            ComponentData::States { values, tstart, tstop } => {
                if values.len() != tstart.len() || values.len() != tstop.len() {
                    return Err(ModelError::LengthMismatch {
                        comp,
                        values: values.len(),
                        times: tstart.len().min(tstop.len()),
                    });
                }
            }
            ComponentData::Series { values, times } => {
                if values.len() != times.len() {
                    return Err(ModelError::LengthMismatch {
                        comp,
                        values: values.len(),
                        times: times.len(),
                    });
                }
            }
            ComponentData::Absent | ComponentData::Flag(_) | ComponentData::Constant(_) => {}
        }

        self.inputs.insert(comp, data);
        self.stage = ModelStage::Defined;
        Ok(())
    }

    /// Resolves all declared inputs onto the time grid.
    pub fn make(&mut self) -> Result<(), ModelError> {
        let mut resolved = BTreeMap::new();
        let node = self.spec.node.name;
        let absent = ComponentData::Absent;

        for &comp in &self.spec.comps {
            let data = self.inputs.get(&comp).unwrap_or(&absent);
            if comp == node {
                self.init_temp = match data {
                    ComponentData::Absent => self.spec.node.init,
                    ComponentData::Constant(value) => *value,
                    ComponentData::Series { values, times } if !values.is_empty() => {
                        crate::telemetry::interpolate(times, values, self.start)
                    }
                    other => {
                        return Err(ModelError::UnsupportedData {
                            comp,
                            kind: other.kind(),
                        })
                    }
                };
                continue;
            }
            resolved.insert(comp, resolve(comp, data, &self.times)?);
        }

        debug!(
            "Made model {} with {} inputs over {} steps",
            self.name,
            resolved.len(),
            self.times.len()
        );
        self.resolved = resolved;
        self.stage = ModelStage::Made;
        Ok(())
    }

    /// Integrates the node temperature over the grid.
    pub fn calc(&mut self) -> Result<(), ModelError> {
        if self.stage == ModelStage::Defined {
            return Err(ModelError::NotMade);
        }

        let tau = self.spec.node.tau;
        let mut temps = Vec::with_capacity(self.times.len());
        let mut temp = self.init_temp;
        temps.push(temp);

        for k in 0..self.times.len() - 1 {
            let dt = self.times[k + 1] - self.times[k];
            let t_eq = self.equilibrium(k);
            temp = t_eq + (temp - t_eq) * (-dt / tau).exp();
            if !temp.is_finite() {
                return Err(ModelError::Diverged { time: self.times[k + 1] });
            }
            temps.push(temp);
        }

        debug_assert_eq!(temps.len(), self.times.len());
        self.prediction = temps;
        self.stage = ModelStage::Calculated;
        Ok(())
    }

    /// Equilibrium temperature for the inputs at grid index `k`.
    pub fn equilibrium(&self, k: usize) -> f64 {
        let input = |comp: ComponentName| self.resolved.get(&comp).map_or(0.0, |v| v[k]);

        self.spec.node.t_sink
            + self.spec.solar_heat(
                input(ComponentName::Pitch),
                input(ComponentName::SimZ),
                input(ComponentName::Eclipse) != 0.0,
            )
            + self.spec.roll_heat(input(ComponentName::Roll))
            + self.spec.electronics_heat(
                input(ComponentName::CcdCount),
                input(ComponentName::FepCount),
                input(ComponentName::VidBoard),
                input(ComponentName::Clocking),
            )
    }

    /// Predicted node temperatures, empty until `calc` has run.
    pub fn prediction(&self) -> &[f64] {
        &self.prediction
    }

    pub fn init_temp(&self) -> f64 {
        self.init_temp
    }

    /// Resolved values of an input slot after `make`.
    pub fn comp_values(&self, comp: ComponentName) -> Option<&[f64]> {
        self.resolved.get(&comp).map(Vec::as_slice)
    }
}

fn resolve(comp: ComponentName, data: &ComponentData, times: &[f64]) -> Result<Vec<f64>, ModelError> {
    match data {
        ComponentData::Absent => Err(ModelError::MissingInput(comp)),
        ComponentData::Flag(flag) => Ok(vec![if *flag { 1.0 } else { 0.0 }; times.len()]),
        ComponentData::Constant(value) => Ok(vec![*value; times.len()]),
        ComponentData::Series { values, times: sample_times } => {
            if values.is_empty() {
                return Err(ModelError::MissingInput(comp));
            }
            Ok(times
                .iter()
                .map(|&t| crate::telemetry::interpolate(sample_times, values, t))
                .collect())
        }
        ComponentData::States { values, tstart, tstop } => {
            check_coverage(comp, tstart, tstop, times)?;
            let last = times.len() - 1;
            times
                .iter()
                .enumerate()
                .map(|(k, &t)| {
                    // Last state starting at or before t. States are half-open
                    // except at the end of the window.
                    let idx = tstart.partition_point(|&s| s <= t);
                    let open = idx > 0 && (t < tstop[idx - 1] || (k == last && t == tstop[idx - 1]));
                    if open {
                        Ok(values[idx - 1])
                    } else {
                        Err(ModelError::StateGap { comp, time: t })
                    }
                })
                .collect()
        }
    }
}

/// Checks that the states overlapping the grid join end to start over the
/// whole of it.
fn check_coverage(comp: ComponentName, tstart: &[f64], tstop: &[f64], times: &[f64]) -> Result<(), ModelError> {
    let (Some(&start), Some(&stop)) = (times.first(), times.last()) else {
        return Ok(());
    };
    let gap = |time: f64| Err(ModelError::StateGap { comp, time });

    let first = tstop.partition_point(|&s| s <= start);
    match tstart.get(first) {
        Some(&first_start) if first_start <= start => {}
        _ => return gap(start),
    }

    let mut covered = tstop[first];
    for (&next_start, &next_stop) in tstart[first + 1..].iter().zip(&tstop[first + 1..]) {
        if covered >= stop {
            break;
        }
        if next_start != covered {
            return gap(covered);
        }
        covered = next_stop;
    }
    if covered < stop {
        return gap(covered);
    }
    Ok(())
}

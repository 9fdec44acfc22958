use crate::calc::ModelBuilder;
use crate::error::CheckError;
use crate::limits::Signal;
use crate::model::{ModelSpec, ThermalModel};
use crate::states::StatesTable;
use crate::telemetry::TelemetrySeries;
use crate::time::format_time;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A contiguous stretch of prediction above the planning limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub tstart: f64,
    pub tstop: f64,
    pub datestart: String,
    pub datestop: String,
    pub max_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub tstart: f64,
    pub tstop: f64,
    pub datestart: String,
    pub datestop: String,
    pub init_temp: f64,
    pub max_temp: f64,
    pub max_time: f64,
    pub planning_limit: f64,
    pub yellow_exceeded: bool,
    pub violations: Vec<Violation>,
}

/// Runs the model over the load states.
///
/// The window starts at `run_start` when it falls inside the states. The
/// initial temperature comes from `t_init`, else telemetry, else the model
/// spec.
pub fn predict(
    calc_model: ModelBuilder,
    spec: &ModelSpec,
    states: &StatesTable,
    telemetry: Option<&TelemetrySeries>,
    run_start: Option<f64>,
    t_init: Option<f64>,
) -> Result<ThermalModel, CheckError> {
    let tstart = run_start.map_or(states.tstart(), |t| t.max(states.tstart()));
    let tstop = states.tstop();
    if tstart >= tstop {
        return Err(CheckError::EmptyWindow { tstart, tstop });
    }

    let seed = match t_init {
        Some(temp) => Some(TelemetrySeries::new(vec![tstart], vec![temp])?),
        None => telemetry.cloned(),
    };
    if seed.is_none() {
        warn!("No telemetry or --T-init given, starting from the model spec temperature");
    }

    info!(
        "Predicting {} from {} to {}",
        spec.name,
        format_time(tstart),
        format_time(tstop)
    );
    Ok(calc_model(spec, states, tstart, tstop, seed.as_ref())?)
}

/// Groups grid points above `limit` into contiguous violations.
pub fn find_violations(times: &[f64], temps: &[f64], limit: f64) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut current: Option<(usize, usize, f64)> = None;

    for (i, &temp) in temps.iter().enumerate() {
        if temp > limit {
            current = Some(match current {
                Some((first, _, max)) => (first, i, max.max(temp)),
                None => (i, i, temp),
            });
        } else if let Some(run) = current.take() {
            violations.push(violation(times, run));
        }
    }
    if let Some(run) = current {
        violations.push(violation(times, run));
    }

    violations
}

fn violation(times: &[f64], (first, last, max_temp): (usize, usize, f64)) -> Violation {
    Violation {
        tstart: times[first],
        tstop: times[last],
        datestart: format_time(times[first]).to_string(),
        datestop: format_time(times[last]).to_string(),
        max_temp,
    }
}

impl PredictionSummary {
    pub fn from_model(model: &ThermalModel, signal: Signal) -> Self {
        let (tstart, tstop) = model.time_bounds();
        let temps = model.prediction();
        let times = model.times();

        let (max_idx, max_temp) = temps
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, t)| if t > best.1 { (i, t) } else { best });

        let planning_limit = signal.planning_limit();
        let violations = find_violations(times, temps, planning_limit);
        for v in &violations {
            warn!(
                "{} planning limit {:.1} C exceeded {} to {} (max {:.2} C)",
                signal.msid(),
                planning_limit,
                v.datestart,
                v.datestop,
                v.max_temp
            );
        }

        Self {
            tstart,
            tstop,
            datestart: format_time(tstart).to_string(),
            datestop: format_time(tstop).to_string(),
            init_temp: model.init_temp(),
            max_temp,
            max_time: times.get(max_idx).copied().unwrap_or(tstart),
            planning_limit,
            yellow_exceeded: max_temp > signal.yellow(),
            violations,
        }
    }
}

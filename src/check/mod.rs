//! Thermal check driver.
//!
//! A [`ThermalCheck`] reads states and telemetry named by [`CheckOptions`],
//! predicts the monitored temperature over the load under review, validates
//! the model against recent telemetry, and writes the results to the output
//! directory.

pub mod prediction;
pub mod report;
pub mod validation;

pub use prediction::{PredictionSummary, Violation};
pub use validation::{MsidValidation, QuantileCheck, ValidationSummary};

use crate::calc::ModelBuilder;
use crate::error::CheckError;
use crate::limits::{Signal, ValidationLimits};
use crate::model::{ModelSpec, ThermalModel};
use crate::options::CheckOptions;
use crate::states::StatesTable;
use crate::telemetry::TelemetrySet;
use crate::time::{format_time, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub msid: String,
    pub name: String,
    pub run_start: Option<String>,
    pub yellow: f64,
    pub planning_limit: f64,
    pub prediction: Option<PredictionSummary>,
    pub validation: Option<ValidationSummary>,
}

impl CheckSummary {
    pub fn has_violations(&self) -> bool {
        self.prediction.as_ref().is_some_and(|p| !p.violations.is_empty())
    }
}

/// Solved models behind a [`CheckSummary`].
#[derive(Debug, Clone)]
pub struct CheckOutput {
    pub summary: CheckSummary,
    pub prediction_model: Option<ThermalModel>,
    pub validation_model: Option<ThermalModel>,
}

pub struct ThermalCheck {
    msid: String,
    signal: Signal,
    validation_limits: ValidationLimits,
    hist_limit: Vec<f64>,
    calc_model: ModelBuilder,
}

impl ThermalCheck {
    pub fn new(
        msid: &str,
        signal: Signal,
        validation_limits: ValidationLimits,
        hist_limit: &[f64],
        calc_model: ModelBuilder,
    ) -> Self {
        Self {
            msid: msid.to_lowercase(),
            signal,
            validation_limits,
            hist_limit: hist_limit.to_vec(),
            calc_model,
        }
    }

    pub fn msid(&self) -> &str {
        &self.msid
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Runs the check and writes its reports.
    pub fn run(&self, opts: &CheckOptions) -> Result<CheckSummary, CheckError> {
        Ok(self.execute(opts)?.summary)
    }

    /// Runs the check, keeping the solved models.
    pub fn execute(&self, opts: &CheckOptions) -> Result<CheckOutput, CheckError> {
        let can_validate = opts.telemetry.is_some() && opts.history_states.is_some();
        if opts.states.is_none() && !can_validate {
            return Err(CheckError::NoInputs);
        }
        if !(opts.days > 0.0) {
            return Err(CheckError::Failed(format!(
                "validation days must be positive, got {}",
                opts.days
            )));
        }

        info!("Running {} check, output in {}", self.signal.msid(), opts.outdir.display());
        let spec = ModelSpec::from_file(&opts.model_spec)?;
        fs::create_dir_all(&opts.outdir)
            .map_err(|e| CheckError::io(format!("creating {}", opts.outdir.display()), e))?;

        let telemetry = opts
            .telemetry
            .as_deref()
            .map(TelemetrySet::from_json_file)
            .transpose()?;
        if opts.telemetry.is_some() && opts.history_states.is_none() {
            warn!("Telemetry given without --history-states, skipping validation");
        }

        let mut prediction = None;
        let mut prediction_model = None;
        if let Some(path) = &opts.states {
            let states = StatesTable::from_json_file(path)?;
            let seed = telemetry.as_ref().and_then(|t| t.get(&self.msid));
            let model = prediction::predict(self.calc_model, &spec, &states, seed, opts.run_start, opts.t_init)?;

            report::write_temperatures(&opts.outdir, &self.msid, &model)?;
            report::write_states(&opts.outdir, &states)?;
            prediction = Some(PredictionSummary::from_model(&model, self.signal));
            prediction_model = Some(model);
        }

        let mut validation = None;
        let mut validation_model = None;
        if let (Some(path), Some(telemetry)) = (&opts.history_states, &telemetry) {
            let states = StatesTable::from_json_file(path)?;
            let model = self.validation_model(&spec, &states, telemetry, opts)?;
            let hist_limit = self.hist_limit.first().copied().unwrap_or(f64::NEG_INFINITY);
            validation = Some(validation::validate(&model, telemetry, self.validation_limits, hist_limit));
            validation_model = Some(model);
        }

        let summary = CheckSummary {
            msid: self.signal.msid().to_string(),
            name: self.signal.name().to_string(),
            run_start: opts.run_start.map(|t| format_time(t).to_string()),
            yellow: self.signal.yellow(),
            planning_limit: self.signal.planning_limit(),
            prediction,
            validation,
        };
        report::write_index(&opts.outdir, &summary)?;

        Ok(CheckOutput {
            summary,
            prediction_model,
            validation_model,
        })
    }

    /// Model over the last `opts.days` of telemetry, limited to the history
    /// states.
    fn validation_model(
        &self,
        spec: &ModelSpec,
        states: &StatesTable,
        telemetry: &TelemetrySet,
        opts: &CheckOptions,
    ) -> Result<ThermalModel, CheckError> {
        let series = telemetry.require(&self.msid)?;
        let tstop = opts
            .run_start
            .map_or(series.tstop(), |t| t.min(series.tstop()))
            .min(states.tstop());
        let tstart = (tstop - opts.days * SECONDS_PER_DAY)
            .max(series.tstart())
            .max(states.tstart());
        if tstart >= tstop {
            return Err(CheckError::EmptyWindow { tstart, tstop });
        }

        info!(
            "Validating {} from {} to {}",
            self.signal.msid(),
            format_time(tstart),
            format_time(tstop)
        );
        let window = series.window(tstart, tstop)?;
        Ok((self.calc_model)(spec, states, tstart, tstop, Some(&window))?)
    }
}

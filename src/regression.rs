//! Regression testing against stored answers.
//!
//! Each load lives in its own directory under `<model_path>/loads/` with a
//! `states.json` and optionally `history.json` and `telemetry.json`.
//! [`RegressionTester::run_models`] runs the full check for every load and
//! [`RegressionTester::run_test`] compares the results with the answers kept
//! under `<model_path>/answers/<load>/`, or stores fresh answers.

use crate::calc::ModelBuilder;
use crate::check::{CheckOutput, ThermalCheck};
use crate::error::CheckError;
use crate::limits::{Signal, ValidationLimits, ValidationMsid};
use crate::options::{default_model_spec, CheckOptions};
use crate::states::StatesTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Absolute tolerance when comparing with stored answers.
pub const ANSWER_TOLERANCE: f64 = 1e-6;

pub const LOADS_DIR: &str = "loads";
pub const ANSWERS_DIR: &str = "answers";
pub const OUTPUT_DIR: &str = "regression_out";

#[derive(Debug, Error)]
pub enum RegressionError {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bad answer file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no {kind} results for load {load}; run the models first")]
    MissingOutput { load: String, kind: TestKind },

    #[error("{kind} answer for load {load} has {expected} values, got {actual}")]
    LengthMismatch {
        load: String,
        kind: TestKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} answer for load {load} has {expected} where {actual} was produced")]
    LabelMismatch {
        load: String,
        kind: TestKind,
        expected: String,
        actual: String,
    },

    #[error("{kind} answer for load {load} differs at {what}: expected {expected}, got {actual}")]
    Mismatch {
        load: String,
        kind: TestKind,
        what: String,
        expected: f64,
        actual: f64,
    },
}

fn io_error(context: String) -> impl FnOnce(std::io::Error) -> RegressionError {
    move |source| RegressionError::Io { context, source }
}

/// Where the states for a regression run come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBuilder {
    /// Load states only.
    Load,
    /// History states followed by the load, so the prediction starts at the
    /// beginning of the history.
    Continuity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Prediction,
    Validation,
}

impl TestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TestKind::Prediction => "prediction",
            TestKind::Validation => "validation",
        }
    }
}

impl core::fmt::Display for TestKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PredictionAnswer {
    times: Vec<f64>,
    temps: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct QuantileAnswer {
    msid: ValidationMsid,
    percentile: u8,
    value: f64,
}

pub struct RegressionTester {
    check: ThermalCheck,
    model_path: PathBuf,
    outputs: BTreeMap<String, CheckOutput>,
}

impl RegressionTester {
    pub fn new(
        msid: &str,
        signal: Signal,
        model_path: &Path,
        validation_limits: ValidationLimits,
        hist_limit: &[f64],
        calc_model: ModelBuilder,
    ) -> Self {
        Self {
            check: ThermalCheck::new(msid, signal, validation_limits, hist_limit, calc_model),
            model_path: model_path.to_path_buf(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn loads_dir(&self) -> PathBuf {
        self.model_path.join(LOADS_DIR)
    }

    pub fn answers_dir(&self) -> PathBuf {
        self.model_path.join(ANSWERS_DIR)
    }

    /// Names of the load directories, sorted.
    pub fn all_loads(&self) -> Result<Vec<String>, RegressionError> {
        let dir = self.loads_dir();
        let entries = fs::read_dir(&dir).map_err(io_error(format!("listing {}", dir.display())))?;

        let mut loads = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_error(format!("listing {}", dir.display())))?;
            if entry.path().is_dir() {
                loads.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        loads.sort();
        Ok(loads)
    }

    /// Runs the check for every load.
    pub fn run_models(&mut self, state_builder: StateBuilder) -> Result<(), RegressionError> {
        for load in self.all_loads()? {
            let output = self.run_load(&load, state_builder)?;
            self.outputs.insert(load, output);
        }
        Ok(())
    }

    fn run_load(&self, load: &str, state_builder: StateBuilder) -> Result<CheckOutput, RegressionError> {
        let load_dir = self.loads_dir().join(load);
        let outdir = self.model_path.join(OUTPUT_DIR).join(load);
        let history = load_dir.join("history.json");
        let telemetry = load_dir.join("telemetry.json");

        let mut opts = CheckOptions::new(&outdir, default_model_spec(self.check.signal().name(), &self.model_path));
        opts.states = Some(load_dir.join("states.json"));
        opts.history_states = history.is_file().then(|| history.clone());
        opts.telemetry = telemetry.is_file().then_some(telemetry);

        if state_builder == StateBuilder::Continuity && history.is_file() {
            let joined = StatesTable::from_json_file(&history)
                .and_then(|h| h.concat(&StatesTable::from_json_file(&load_dir.join("states.json"))?))
                .map_err(CheckError::from)?;
            fs::create_dir_all(&outdir).map_err(io_error(format!("creating {}", outdir.display())))?;
            let path = outdir.join("continuity_states.json");
            let json = serde_json::to_string(&joined).map_err(|source| CheckError::Serialize {
                what: "continuity states",
                source,
            })?;
            fs::write(&path, json).map_err(io_error(format!("writing {}", path.display())))?;
            opts.states = Some(path);
        }

        info!("Running regression load {} ({:?})", load, state_builder);
        Ok(self.check.execute(&opts)?)
    }

    /// Compares the results of `load` with stored answers, or stores them
    /// when `answer_store` is set.
    pub fn run_test(&self, kind: TestKind, answer_store: bool, load: &str) -> Result<(), RegressionError> {
        let answer_path = self.answers_dir().join(load).join(format!("{kind}.json"));
        let missing = || RegressionError::MissingOutput {
            load: load.to_string(),
            kind,
        };
        let output = self.outputs.get(load).ok_or_else(missing)?;

        match kind {
            TestKind::Prediction => {
                let model = output.prediction_model.as_ref().ok_or_else(missing)?;
                let answer = PredictionAnswer {
                    times: model.times().to_vec(),
                    temps: model.prediction().to_vec(),
                };
                if answer_store {
                    return store_answer(&answer_path, &answer);
                }
                let expected: PredictionAnswer = read_answer(&answer_path)?;
                compare(load, kind, &labelled("time", &expected.times), &labelled("time", &answer.times))?;
                compare(load, kind, &labelled("temp", &expected.temps), &labelled("temp", &answer.temps))
            }
            TestKind::Validation => {
                let summary = output.summary.validation.as_ref().ok_or_else(missing)?;
                let answer: Vec<QuantileAnswer> = summary
                    .msids
                    .iter()
                    .flat_map(|m| {
                        m.checks.iter().map(move |c| QuantileAnswer {
                            msid: m.msid,
                            percentile: c.percentile,
                            value: c.value,
                        })
                    })
                    .collect();
                if answer_store {
                    return store_answer(&answer_path, &answer);
                }
                let expected: Vec<QuantileAnswer> = read_answer(&answer_path)?;
                compare(load, kind, &quantile_labels(&expected), &quantile_labels(&answer))
            }
        }
    }
}

fn labelled(name: &str, values: &[f64]) -> Vec<(String, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (format!("{name}[{i}]"), v))
        .collect()
}

fn quantile_labels(answers: &[QuantileAnswer]) -> Vec<(String, f64)> {
    answers
        .iter()
        .map(|a| (format!("{} {}%", a.msid.as_str(), a.percentile), a.value))
        .collect()
}

fn compare(
    load: &str,
    kind: TestKind,
    expected: &[(String, f64)],
    actual: &[(String, f64)],
) -> Result<(), RegressionError> {
    if expected.len() != actual.len() {
        return Err(RegressionError::LengthMismatch {
            load: load.to_string(),
            kind,
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for ((what, e), (actual_what, a)) in expected.iter().zip(actual) {
        if what != actual_what {
            return Err(RegressionError::LabelMismatch {
                load: load.to_string(),
                kind,
                expected: what.clone(),
                actual: actual_what.clone(),
            });
        }
        if (e - a).abs() > ANSWER_TOLERANCE {
            return Err(RegressionError::Mismatch {
                load: load.to_string(),
                kind,
                what: what.clone(),
                expected: *e,
                actual: *a,
            });
        }
    }
    Ok(())
}

fn store_answer<T: Serialize>(path: &Path, answer: &T) -> Result<(), RegressionError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_error(format!("creating {}", dir.display())))?;
    }
    let json = serde_json::to_string_pretty(answer).map_err(|source| RegressionError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(io_error(format!("writing {}", path.display())))?;
    info!("Stored answer {}", path.display());
    Ok(())
}

fn read_answer<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, RegressionError> {
    let text = fs::read_to_string(path).map_err(io_error(format!("reading {}", path.display())))?;
    serde_json::from_str(&text).map_err(|source| RegressionError::Json {
        path: path.display().to_string(),
        source,
    })
}

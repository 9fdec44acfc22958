//! # BEP PCB Thermal Check
//!
//! Load review and model validation for the ACIS BEP PCB temperature
//! (`TMP_BEP_PCB`).
//!
//! ## Features
//!
//! - **Prediction**: single-node thermal model driven by commanded states
//! - **Planning limit check**: violations of yellow minus margin, grouped in time
//! - **Validation**: quantiles of telemetry minus model against fixed tolerances
//! - **Regression testing**: stored answers per load
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bep_pcb_check::{bep_pcb_check, options::CheckOptions};
//!
//! let check = bep_pcb_check();
//! let mut opts = CheckOptions::new("out", bep_pcb_check::model_path().join("bep_pcb_model_spec.json"));
//! opts.states = Some("states.json".into());
//!
//! match check.run(&opts) {
//!     Ok(summary) => println!("max {:?}", summary.prediction.map(|p| p.max_temp)),
//!     Err(e) => eprintln!("ERROR: {}", e),
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`limits`] - Yellow limit, margin and validation tolerances
//! - [`calc`] - Model builder wiring states and telemetry into the model
//! - [`model`] - Thermal model engine
//! - [`check`] - Check driver, prediction, validation and reports
//! - [`cli`] - Exit status handling for the command-line entry point
//! - [`regression`] - Answer-based regression testing

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]

pub mod calc;
pub mod check;
pub mod cli;
pub mod error;
pub mod limits;
pub mod model;
pub mod options;
pub mod regression;
pub mod roll;
pub mod states;
pub mod telemetry;
pub mod time;

use std::path::PathBuf;

// Re-export main public types for convenience
pub use calc::calc_model;
pub use check::{CheckSummary, ThermalCheck};
pub use error::CheckError;
pub use limits::Signal;
pub use model::{ModelSpec, ThermalModel};

/// MSID key of the monitored temperature.
pub const MSID_KEY: &str = "tmp_bep_pcb";

/// Directory holding the model specification shipped with this crate.
pub fn model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// The BEP PCB check with its limits and model builder.
pub fn bep_pcb_check() -> ThermalCheck {
    ThermalCheck::new(
        MSID_KEY,
        Signal::BepPcb,
        limits::validation_limits,
        &limits::HIST_LIMIT,
        calc_model,
    )
}

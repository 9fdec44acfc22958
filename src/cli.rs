//! Translation of check results into process outcomes.

use crate::check::{CheckSummary, ThermalCheck};
use crate::error::CheckError;
use crate::options::CheckOptions;
use std::io::Write;
use tracing::debug;

/// Anything that can run a check from parsed options.
pub trait Driver {
    fn run(&self, opts: &CheckOptions) -> Result<CheckSummary, CheckError>;
}

impl Driver for ThermalCheck {
    fn run(&self, opts: &CheckOptions) -> Result<CheckSummary, CheckError> {
        ThermalCheck::run(self, opts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

/// Result of [`run_driver`] when the run completed or was reduced to an exit
/// status.
#[derive(Debug)]
pub struct Outcome {
    pub status: ExitStatus,
    pub summary: Option<CheckSummary>,
}

/// Runs `driver`. With `opts.traceback` set, a failure is handed back to the
/// caller untouched; otherwise it becomes a one-line `ERROR:` message on
/// `stderr` and a failure status.
pub fn run_driver<D, W>(driver: &D, opts: &CheckOptions, stderr: &mut W) -> Result<Outcome, CheckError>
where
    D: Driver + ?Sized,
    W: Write,
{
    match driver.run(opts) {
        Ok(summary) => Ok(Outcome {
            status: ExitStatus::Success,
            summary: Some(summary),
        }),
        Err(e) if opts.traceback => Err(e),
        Err(e) => {
            debug!("Check failed: {:?}", e);
            writeln!(stderr, "ERROR: {e}").map_err(|io| CheckError::io("writing error message", io))?;
            Ok(Outcome {
                status: ExitStatus::Failure,
                summary: None,
            })
        }
    }
}

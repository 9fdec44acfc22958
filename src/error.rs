use crate::model::ModelError;
use crate::states::StatesError;
use crate::telemetry::TelemetryError;
use thiserror::Error;

/// Errors surfaced by a thermal check run.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    States(#[from] StatesError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("nothing to check: provide --states and/or --telemetry with --history-states")]
    NoInputs,

    #[error("prediction window {tstart}-{tstop} is empty")]
    EmptyWindow { tstart: f64, tstop: f64 },

    /// Failure with only a message to show, such as unusable options.
    #[error("{0}")]
    Failed(String),
}

impl CheckError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

//! Telemetry series and interpolation helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to read telemetry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse telemetry file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("telemetry has {times} times but {vals} values")]
    LengthMismatch { times: usize, vals: usize },

    #[error("telemetry times not strictly increasing at index {index}")]
    NotIncreasing { index: usize },

    #[error("telemetry series is empty")]
    Empty,

    #[error("telemetry for '{0}' not found")]
    MissingMsid(String),
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    times: Vec<f64>,
    vals: Vec<f64>,
}

/// Samples of one telemetry quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct TelemetrySeries {
    times: Vec<f64>,
    vals: Vec<f64>,
}

impl TelemetrySeries {
    pub fn new(times: Vec<f64>, vals: Vec<f64>) -> Result<Self, TelemetryError> {
        if times.len() != vals.len() {
            return Err(TelemetryError::LengthMismatch {
                times: times.len(),
                vals: vals.len(),
            });
        }
        if times.is_empty() {
            return Err(TelemetryError::Empty);
        }
        if let Some(index) = times.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(TelemetryError::NotIncreasing { index: index + 1 });
        }
        Ok(Self { times, vals })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn vals(&self) -> &[f64] {
        &self.vals
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn tstart(&self) -> f64 {
        self.times[0]
    }

    pub fn tstop(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Value at `time`, linearly interpolated and clamped at the ends.
    pub fn value_at(&self, time: f64) -> f64 {
        interpolate(&self.times, &self.vals, time)
    }

    /// Samples inside `[tstart, tstop]`.
    pub fn window(&self, tstart: f64, tstop: f64) -> Result<Self, TelemetryError> {
        let lo = self.times.partition_point(|&t| t < tstart);
        let hi = self.times.partition_point(|&t| t <= tstop);
        Self::new(self.times[lo..hi].to_vec(), self.vals[lo..hi].to_vec())
    }
}

impl TryFrom<RawSeries> for TelemetrySeries {
    type Error = TelemetryError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Self::new(raw.times, raw.vals)
    }
}

/// Telemetry keyed by lower-case MSID. Keys are lower-cased on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, TelemetrySeries>",
    into = "BTreeMap<String, TelemetrySeries>"
)]
pub struct TelemetrySet {
    series: BTreeMap<String, TelemetrySeries>,
}

impl From<BTreeMap<String, TelemetrySeries>> for TelemetrySet {
    fn from(raw: BTreeMap<String, TelemetrySeries>) -> Self {
        let mut set = Self::default();
        for (msid, series) in raw {
            set.insert(&msid, series);
        }
        set
    }
}

impl From<TelemetrySet> for BTreeMap<String, TelemetrySeries> {
    fn from(set: TelemetrySet) -> Self {
        set.series
    }
}

impl TelemetrySet {
    pub fn from_json_file(path: &Path) -> Result<Self, TelemetryError> {
        let text = fs::read_to_string(path).map_err(|source| TelemetryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| TelemetryError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn insert(&mut self, msid: &str, series: TelemetrySeries) {
        self.series.insert(msid.to_lowercase(), series);
    }

    pub fn get(&self, msid: &str) -> Option<&TelemetrySeries> {
        self.series.get(&msid.to_lowercase())
    }

    pub fn require(&self, msid: &str) -> Result<&TelemetrySeries, TelemetryError> {
        self.get(msid)
            .ok_or_else(|| TelemetryError::MissingMsid(msid.to_lowercase()))
    }
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`, clamped to the end
/// values. `xs` must be increasing and non-empty.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert!(!xs.is_empty() && xs.len() == ys.len());

    let upper = xs.partition_point(|&v| v <= x);
    if upper == 0 {
        return ys[0];
    }
    if upper == xs.len() {
        return ys[ys.len() - 1];
    }

    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

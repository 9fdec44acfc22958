//! Model validation against telemetry.

use crate::limits::{ValidationLimits, ValidationMsid};
use crate::model::{ComponentName, ThermalModel};
use crate::telemetry::{interpolate, TelemetrySet};
use crate::time::format_time;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use tracing::{debug, warn};

/// Upper bound on configured quantiles per quantity.
pub const MAX_QUANTILES: usize = 8;
/// TSCPOS differences are compared in kilo-steps.
const TSCPOS_SCALE: f64 = 1000.0;
const HISTOGRAM_BIN_C: f64 = 1.0;

const_assert!(MAX_QUANTILES >= 3);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileCheck {
    pub percentile: u8,
    /// Quantile of `telemetry - model`.
    pub value: f64,
    pub limit: f64,
    pub violated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsidValidation {
    pub msid: ValidationMsid,
    pub samples: usize,
    pub checks: heapless::Vec<QuantileCheck, MAX_QUANTILES>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub tstart: f64,
    pub tstop: f64,
    pub datestart: String,
    pub datestop: String,
    pub hist_limit: f64,
    pub msids: Vec<MsidValidation>,
    /// Model error of the checked MSID above `hist_limit`.
    pub histogram: Vec<HistogramBin>,
}

impl ValidationSummary {
    pub fn has_violations(&self) -> bool {
        self.msids
            .iter()
            .any(|m| m.checks.iter().any(|c| c.violated))
    }
}

/// Percentile of already sorted data with linear interpolation between
/// closest ranks.
pub fn quantile(sorted: &[f64], percentile: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }

    let pos = (percentile / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn model_values(model: &ThermalModel, msid: ValidationMsid) -> Option<(&[f64], f64)> {
    match msid {
        ValidationMsid::TmpBepPcb => Some((model.prediction(), 1.0)),
        ValidationMsid::Pitch => model.comp_values(ComponentName::Pitch).map(|v| (v, 1.0)),
        ValidationMsid::Tscpos => model
            .comp_values(ComponentName::SimZ)
            .map(|v| (v, TSCPOS_SCALE)),
    }
}

fn histogram(diffs: &[f64]) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (diffs.first(), diffs.last()) else {
        return Vec::new();
    };

    let lo = (min / HISTOGRAM_BIN_C).floor() * HISTOGRAM_BIN_C;
    let n_bins = (((max - lo) / HISTOGRAM_BIN_C).floor() as usize) + 1;
    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            lo: lo + i as f64 * HISTOGRAM_BIN_C,
            hi: lo + (i + 1) as f64 * HISTOGRAM_BIN_C,
            count: 0,
        })
        .collect();

    for &d in diffs {
        let idx = (((d - lo) / HISTOGRAM_BIN_C).floor() as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Compares a solved model against telemetry over the model window.
///
/// Quantities without telemetry are skipped. The checked MSID only uses
/// samples at or above `hist_limit`.
pub fn validate(
    model: &ThermalModel,
    telemetry: &TelemetrySet,
    limits: ValidationLimits,
    hist_limit: f64,
) -> ValidationSummary {
    let (tstart, tstop) = model.time_bounds();
    let mut msids = Vec::new();
    let mut histogram_bins = Vec::new();

    for msid in ValidationMsid::ALL {
        let Some(series) = telemetry.get(msid.telemetry_key()) else {
            debug!("No {} telemetry, skipping validation", msid.as_str());
            continue;
        };
        let Some((predicted, scale)) = model_values(model, msid).filter(|(v, _)| !v.is_empty()) else {
            debug!("Model has no {} values, skipping validation", msid.as_str());
            continue;
        };

        let mut diffs: Vec<f64> = series
            .times()
            .iter()
            .zip(series.vals())
            .filter(|&(&t, &v)| {
                t >= tstart && t <= tstop && (msid != ValidationMsid::TmpBepPcb || v >= hist_limit)
            })
            .map(|(&t, &v)| (v - interpolate(model.times(), predicted, t)) / scale)
            .collect();
        if diffs.is_empty() {
            warn!("No {} samples in the validation window", msid.as_str());
            continue;
        }
        diffs.sort_by(f64::total_cmp);

        let mut checks = heapless::Vec::new();
        for tol in limits(msid) {
            let value = quantile(&diffs, f64::from(tol.percentile));
            let check = QuantileCheck {
                percentile: tol.percentile,
                value,
                limit: tol.tolerance,
                violated: value.abs() > tol.tolerance,
            };
            if check.violated {
                warn!(
                    "{} {}% quantile error {:.2} exceeds {:.2}",
                    msid.as_str(),
                    tol.percentile,
                    value,
                    tol.tolerance
                );
            }
            if checks.push(check).is_err() {
                warn!("Ignoring {} quantiles beyond {}", msid.as_str(), MAX_QUANTILES);
                break;
            }
        }

        if msid == ValidationMsid::TmpBepPcb {
            histogram_bins = histogram(&diffs);
        }
        msids.push(MsidValidation {
            msid,
            samples: diffs.len(),
            checks,
        });
    }

    ValidationSummary {
        tstart,
        tstop,
        datestart: format_time(tstart).to_string(),
        datestop: format_time(tstop).to_string(),
        hist_limit,
        msids,
        histogram: histogram_bins,
    }
}

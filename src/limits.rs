//! Thermal limits for the BEP PCB check.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

/// Yellow high IPCL limit, degC.
pub const BEP_PCB_YELLOW_C: f64 = 45.0;
/// Difference between the yellow limit and the planning limit, degC.
pub const BEP_PCB_MARGIN_C: f64 = 2.0;

/// Lower temperature bound of the model-error histogram, degC.
pub const HIST_LIMIT: [f64; 1] = [20.0];

const_assert!(BEP_PCB_MARGIN_C > 0.0);
const_assert!(BEP_PCB_MARGIN_C < BEP_PCB_YELLOW_C);

/// Acceptable `telemetry - model` deviation at a given percentile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileTolerance {
    pub percentile: u8,
    pub tolerance: f64,
}

macro_rules! tol {
    ($percentile:expr, $tolerance:expr) => {
        QuantileTolerance { percentile: $percentile, tolerance: $tolerance }
    };
}

// 1% and 99% TMP_BEP_PCB limits follow the 2.0 degC planning padding.
const TMP_BEP_PCB_LIMITS: [QuantileTolerance; 3] = [tol!(1, 2.0), tol!(50, 1.0), tol!(99, 2.0)];
const PITCH_LIMITS: [QuantileTolerance; 2] = [tol!(1, 3.0), tol!(99, 3.0)];
const TSCPOS_LIMITS: [QuantileTolerance; 2] = [tol!(1, 2.5), tol!(99, 2.5)];

/// Monitored signals with a yellow limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    BepPcb,
}

impl Signal {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bep_pcb" => Some(Signal::BepPcb),
            _ => None,
        }
    }

    /// Short name used for outputs and model files.
    pub fn name(self) -> &'static str {
        match self {
            Signal::BepPcb => "bep_pcb",
        }
    }

    pub fn msid(self) -> &'static str {
        match self {
            Signal::BepPcb => "TMP_BEP_PCB",
        }
    }

    pub fn yellow(self) -> f64 {
        match self {
            Signal::BepPcb => BEP_PCB_YELLOW_C,
        }
    }

    pub fn margin(self) -> f64 {
        match self {
            Signal::BepPcb => BEP_PCB_MARGIN_C,
        }
    }

    /// Threshold used for forward-looking load review.
    pub fn planning_limit(self) -> f64 {
        self.yellow() - self.margin()
    }
}

/// Quantities validated against telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationMsid {
    #[serde(rename = "TMP_BEP_PCB")]
    TmpBepPcb,
    #[serde(rename = "PITCH")]
    Pitch,
    #[serde(rename = "TSCPOS")]
    Tscpos,
}

impl ValidationMsid {
    pub const ALL: [ValidationMsid; 3] = [
        ValidationMsid::TmpBepPcb,
        ValidationMsid::Pitch,
        ValidationMsid::Tscpos,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMsid::TmpBepPcb => "TMP_BEP_PCB",
            ValidationMsid::Pitch => "PITCH",
            ValidationMsid::Tscpos => "TSCPOS",
        }
    }

    /// Key of this quantity in a telemetry file.
    pub fn telemetry_key(self) -> &'static str {
        match self {
            ValidationMsid::TmpBepPcb => "tmp_bep_pcb",
            ValidationMsid::Pitch => "pitch",
            ValidationMsid::Tscpos => "tscpos",
        }
    }

    pub fn limits(self) -> &'static [QuantileTolerance] {
        match self {
            ValidationMsid::TmpBepPcb => &TMP_BEP_PCB_LIMITS,
            ValidationMsid::Pitch => &PITCH_LIMITS,
            ValidationMsid::Tscpos => &TSCPOS_LIMITS,
        }
    }
}

/// Per-quantity validation limits handed to the check driver.
pub type ValidationLimits = fn(ValidationMsid) -> &'static [QuantileTolerance];

/// Validation limits of the BEP PCB check.
pub fn validation_limits(msid: ValidationMsid) -> &'static [QuantileTolerance] {
    msid.limits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planning_limit() {
        assert_eq!(Signal::BepPcb.planning_limit(), 43.0);
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(Signal::from_name("bep_pcb"), Some(Signal::BepPcb));
        assert_eq!(Signal::from_name("dpa"), None);
        assert_eq!(Signal::BepPcb.msid(), "TMP_BEP_PCB");
    }

    #[test]
    fn test_validation_limits_sorted_by_percentile() {
        for msid in ValidationMsid::ALL {
            let limits = msid.limits();
            assert!(limits.windows(2).all(|w| w[0].percentile < w[1].percentile));
            assert!(limits.iter().all(|l| l.tolerance > 0.0));
        }
    }
}

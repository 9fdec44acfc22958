use super::{ComponentName, ModelError};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use std::fs;
use std::path::Path;

/// Default integration step, seconds.
pub const DEFAULT_DT: f64 = 328.0;

const_assert!(DEFAULT_DT > 0.0);

fn default_dt() -> f64 {
    DEFAULT_DT
}

/// Parameters of a single-node thermal model, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    #[serde(default = "default_dt")]
    pub dt: f64,
    pub node: NodeSpec,
    /// Input slots this model reads.
    pub comps: Vec<ComponentName>,
    pub solar: SolarHeatSpec,
    #[serde(default)]
    pub roll: RollHeatSpec,
    pub electronics: ElectronicsSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: ComponentName,
    /// Starting temperature when no telemetry is bound, degC.
    pub init: f64,
    /// Time constant, seconds.
    pub tau: f64,
    /// Sink temperature with all heat terms at zero, degC.
    pub t_sink: f64,
}

/// Equilibrium offset from solar heating versus pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarHeatSpec {
    pub pitches: Vec<f64>,
    pub powers: Vec<f64>,
    /// Extra offset while HRC is in the focal plane (`sim_z < 0`).
    #[serde(default)]
    pub hrc_bias: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollHeatSpec {
    pub p_plus_y: f64,
    pub p_minus_y: f64,
}

/// Linear electronics dissipation terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectronicsSpec {
    pub bias: f64,
    pub ccd_count: f64,
    pub fep_count: f64,
    pub vid_board: f64,
    pub clocking: f64,
}

impl ModelSpec {
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path).map_err(|source| ModelError::SpecIo {
            path: path.display().to_string(),
            source,
        })?;
        let spec: ModelSpec = serde_json::from_str(&text).map_err(|source| ModelError::SpecJson {
            path: path.display().to_string(),
            source,
        })?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: &str| Err(ModelError::InvalidSpec(reason.to_string()));

        if !(self.dt > 0.0) {
            return invalid("dt must be positive");
        }
        if !(self.node.tau > 0.0) {
            return invalid("node tau must be positive");
        }
        if !self.comps.contains(&self.node.name) {
            return invalid("node must be listed in comps");
        }
        if self.solar.pitches.is_empty() || self.solar.pitches.len() != self.solar.powers.len() {
            return invalid("solar pitches and powers must be non-empty and the same length");
        }
        if !self.solar.pitches.windows(2).all(|w| w[0] < w[1]) {
            return invalid("solar pitches must be increasing");
        }
        Ok(())
    }

    pub fn declares(&self, comp: ComponentName) -> bool {
        self.comps.contains(&comp)
    }

    /// Solar heating offset at `pitch`, clamped outside the table.
    pub fn solar_heat(&self, pitch: f64, sim_z: f64, eclipse: bool) -> f64 {
        if eclipse {
            return 0.0;
        }
        let heat = crate::telemetry::interpolate(&self.solar.pitches, &self.solar.powers, pitch);
        if sim_z < 0.0 {
            heat + self.solar.hrc_bias
        } else {
            heat
        }
    }

    pub fn roll_heat(&self, roll_deg: f64) -> f64 {
        let coeff = if roll_deg >= 0.0 {
            self.roll.p_plus_y
        } else {
            self.roll.p_minus_y
        };
        coeff * roll_deg.to_radians().sin().abs()
    }

    pub fn electronics_heat(&self, ccd_count: f64, fep_count: f64, vid_board: f64, clocking: f64) -> f64 {
        let e = &self.electronics;
        e.bias + e.ccd_count * ccd_count + e.fep_count * fep_count + e.vid_board * vid_board + e.clocking * clocking
    }
}

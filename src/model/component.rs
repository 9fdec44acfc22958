use serde::{Deserialize, Serialize};

/// Named input slots a thermal model can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentName {
    SimZ,
    Eclipse,
    TmpBepPcb,
    Roll,
    CcdCount,
    FepCount,
    VidBoard,
    Clocking,
    Pitch,
}

impl ComponentName {
    pub const ALL: [ComponentName; 9] = [
        ComponentName::SimZ,
        ComponentName::Eclipse,
        ComponentName::TmpBepPcb,
        ComponentName::Roll,
        ComponentName::CcdCount,
        ComponentName::FepCount,
        ComponentName::VidBoard,
        ComponentName::Clocking,
        ComponentName::Pitch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentName::SimZ => "sim_z",
            ComponentName::Eclipse => "eclipse",
            ComponentName::TmpBepPcb => "tmp_bep_pcb",
            ComponentName::Roll => "roll",
            ComponentName::CcdCount => "ccd_count",
            ComponentName::FepCount => "fep_count",
            ComponentName::VidBoard => "vid_board",
            ComponentName::Clocking => "clocking",
            ComponentName::Pitch => "pitch",
        }
    }
}

impl core::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data bound to a component slot before `make`.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    /// No data; only valid for the predicted node.
    Absent,
    Flag(bool),
    Constant(f64),
    /// Step function: `values[i]` holds over `[tstart[i], tstop[i])`.
    States {
        values: Vec<f64>,
        tstart: Vec<f64>,
        tstop: Vec<f64>,
    },
    /// Sampled series, linearly interpolated.
    Series { values: Vec<f64>, times: Vec<f64> },
}

impl ComponentData {
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentData::Absent => "absent",
            ComponentData::Flag(_) => "flag",
            ComponentData::Constant(_) => "constant",
            ComponentData::States { .. } => "states",
            ComponentData::Series { .. } => "series",
        }
    }
}

//! Commanded states: time-bracketed spacecraft configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatesError {
    #[error("failed to read states file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse states file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("states table is empty")]
    Empty,

    #[error("state {index} has tstart {tstart} not before tstop {tstop}")]
    InvalidInterval { index: usize, tstart: f64, tstop: f64 },

    #[error("state {index} starts at {tstart}, before the previous state ends at {previous_tstop}")]
    Overlap {
        index: usize,
        tstart: f64,
        previous_tstop: f64,
    },

    #[error("states do not join: state {index} starts at {tstart}, previous ends at {previous_tstop}")]
    NotContiguous {
        index: usize,
        tstart: f64,
        previous_tstop: f64,
    },
}

/// One commanded state, valid over `[tstart, tstop)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub tstart: f64,
    pub tstop: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datestart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datestop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsid: Option<u32>,
    /// SIM translation table position, motor steps.
    pub simpos: f64,
    /// Sun pitch angle, degrees.
    pub pitch: f64,
    pub ccd_count: u8,
    pub fep_count: u8,
    pub vid_board: u8,
    pub clocking: u8,
    /// Attitude quaternion, scalar last.
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
}

impl StateRecord {
    pub fn value(&self, key: StateKey) -> f64 {
        match key {
            StateKey::Simpos => self.simpos,
            StateKey::Pitch => self.pitch,
            StateKey::CcdCount => f64::from(self.ccd_count),
            StateKey::FepCount => f64::from(self.fep_count),
            StateKey::VidBoard => f64::from(self.vid_board),
            StateKey::Clocking => f64::from(self.clocking),
        }
    }

    pub fn quaternion(&self) -> [f64; 4] {
        [self.q1, self.q2, self.q3, self.q4]
    }

    pub fn midpoint(&self) -> f64 {
        (self.tstart + self.tstop) / 2.0
    }
}

/// Numeric state columns that drive the thermal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    Simpos,
    Pitch,
    CcdCount,
    FepCount,
    VidBoard,
    Clocking,
}

impl StateKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::Simpos => "simpos",
            StateKey::Pitch => "pitch",
            StateKey::CcdCount => "ccd_count",
            StateKey::FepCount => "fep_count",
            StateKey::VidBoard => "vid_board",
            StateKey::Clocking => "clocking",
        }
    }
}

/// Ordered, non-overlapping commanded states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StateRecord>", into = "Vec<StateRecord>")]
pub struct StatesTable {
    records: Vec<StateRecord>,
}

impl StatesTable {
    /// Builds a table, checking interval ordering. Gaps between records are
    /// allowed here and reported by the model when they fall inside a run.
    pub fn new(records: Vec<StateRecord>) -> Result<Self, StatesError> {
        if records.is_empty() {
            return Err(StatesError::Empty);
        }

        for (index, record) in records.iter().enumerate() {
            if !(record.tstart < record.tstop) {
                return Err(StatesError::InvalidInterval {
                    index,
                    tstart: record.tstart,
                    tstop: record.tstop,
                });
            }
            if index > 0 {
                let previous_tstop = records[index - 1].tstop;
                if record.tstart < previous_tstop {
                    return Err(StatesError::Overlap {
                        index,
                        tstart: record.tstart,
                        previous_tstop,
                    });
                }
            }
        }

        Ok(Self { records })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StatesError> {
        let text = fs::read_to_string(path).map_err(|source| StatesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StatesError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Joins two tables, e.g. history states followed by a new load. Records
    /// of `later` that start before the end of `self` are dropped, and the
    /// result must not leave a gap at the seam.
    pub fn concat(&self, later: &StatesTable) -> Result<Self, StatesError> {
        let mut records = self.records.clone();
        let tstop = self.tstop();
        records.extend(later.records.iter().filter(|r| r.tstart >= tstop).cloned());

        let seam = self.records.len();
        if let Some(first_new) = records.get(seam) {
            if first_new.tstart != tstop {
                return Err(StatesError::NotContiguous {
                    index: seam,
                    tstart: first_new.tstart,
                    previous_tstop: tstop,
                });
            }
        }

        Self::new(records)
    }

    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn tstart(&self) -> f64 {
        self.records.first().map_or(0.0, |r| r.tstart)
    }

    pub fn tstop(&self) -> f64 {
        self.records.last().map_or(0.0, |r| r.tstop)
    }

    pub fn tstarts(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.tstart).collect()
    }

    pub fn tstops(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.tstop).collect()
    }

    pub fn column(&self, key: StateKey) -> Vec<f64> {
        self.records.iter().map(|r| r.value(key)).collect()
    }
}

impl TryFrom<Vec<StateRecord>> for StatesTable {
    type Error = StatesError;

    fn try_from(records: Vec<StateRecord>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<StatesTable> for Vec<StateRecord> {
    fn from(table: StatesTable) -> Self {
        table.records
    }
}

#![allow(dead_code)]

use bep_pcb_check::model::ModelSpec;
use bep_pcb_check::states::{StateRecord, StatesTable};
use bep_pcb_check::telemetry::TelemetrySeries;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// 2020:068 or so; any post-2017 time avoids leap second edges.
pub const T0: f64 = 700_000_000.0;
pub const DAY: f64 = 86_400.0;

/// Equilibrium of `test_spec` under `state` defaults.
pub const T_EQ: f64 = 37.5;

pub fn state(tstart: f64, tstop: f64) -> StateRecord {
    StateRecord {
        tstart,
        tstop,
        datestart: None,
        datestop: None,
        obsid: Some(23_456),
        simpos: 75_624.0,
        pitch: 90.0,
        ccd_count: 6,
        fep_count: 6,
        vid_board: 1,
        clocking: 1,
        q1: 0.0,
        q2: 0.0,
        q3: 0.0,
        q4: 1.0,
    }
}

/// `n` equal back-to-back states covering `[tstart, tstop]`.
pub fn constant_states(tstart: f64, tstop: f64, n: usize) -> StatesTable {
    let step = (tstop - tstart) / n as f64;
    let records = (0..n)
        .map(|i| {
            let start = tstart + i as f64 * step;
            let stop = if i + 1 == n { tstop } else { start + step };
            state(start, stop)
        })
        .collect();
    StatesTable::new(records).unwrap()
}

/// Small model with flat solar heating and no roll dependence.
pub fn test_spec() -> ModelSpec {
    spec_with_sink(20.0)
}

pub fn spec_with_sink(t_sink: f64) -> ModelSpec {
    serde_json::from_value(serde_json::json!({
        "name": "bep_pcb",
        "dt": 328.0,
        "node": {"name": "tmp_bep_pcb", "init": 30.0, "tau": 1000.0, "t_sink": t_sink},
        "comps": ["sim_z", "eclipse", "tmp_bep_pcb", "roll", "ccd_count", "fep_count",
                  "vid_board", "clocking", "pitch"],
        "solar": {"pitches": [45.0, 180.0], "powers": [5.0, 5.0], "hrc_bias": -1.0},
        "roll": {"p_plus_y": 0.0, "p_minus_y": 0.0},
        "electronics": {"bias": 1.0, "ccd_count": 0.5, "fep_count": 1.0, "vid_board": 2.0, "clocking": 0.5}
    }))
    .unwrap()
}

pub fn series(times: Vec<f64>, vals: Vec<f64>) -> TelemetrySeries {
    TelemetrySeries::new(times, vals).unwrap()
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Telemetry file body with the given quantities.
pub fn telemetry_json(entries: Vec<(&str, Vec<f64>, Vec<f64>)>) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (msid, times, vals) in entries {
        map.insert(msid.to_string(), serde_json::json!({"times": times, "vals": vals}));
    }
    serde_json::Value::Object(map)
}

use super::CheckSummary;
use crate::error::CheckError;
use crate::model::ThermalModel;
use crate::states::StatesTable;
use crate::time::format_time;
use colored::*;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

pub const INDEX_FILE: &str = "index.json";
pub const TEMPERATURES_FILE: &str = "temperatures.dat";
pub const STATES_FILE: &str = "states.dat";

fn write_file(path: &Path, contents: &str) -> Result<(), CheckError> {
    fs::write(path, contents).map_err(|e| CheckError::io(format!("writing {}", path.display()), e))?;
    info!("Wrote {}", path.display());
    Ok(())
}

pub fn write_index(outdir: &Path, summary: &CheckSummary) -> Result<(), CheckError> {
    let json = serde_json::to_string_pretty(summary).map_err(|source| CheckError::Serialize {
        what: "check summary",
        source,
    })?;
    write_file(&outdir.join(INDEX_FILE), &json)
}

/// Predicted temperatures, one grid point per line.
pub fn write_temperatures(outdir: &Path, msid: &str, model: &ThermalModel) -> Result<(), CheckError> {
    let mut out = format!("{:<14} {:<21} {}\n", "time", "date", msid.to_lowercase());
    for (&t, &temp) in model.times().iter().zip(model.prediction()) {
        let _ = writeln!(out, "{t:<14.2} {:<21} {temp:.2}", format_time(t));
    }
    write_file(&outdir.join(TEMPERATURES_FILE), &out)
}

pub fn write_states(outdir: &Path, states: &StatesTable) -> Result<(), CheckError> {
    let mut out = format!(
        "{:<21} {:<21} {:>14} {:>14} {:>10} {:>7} {:>4} {:>4} {:>4} {:>4}\n",
        "datestart", "datestop", "tstart", "tstop", "simpos", "pitch", "ccd", "fep", "vid", "clk"
    );
    for r in states.records() {
        let _ = writeln!(
            out,
            "{:<21} {:<21} {:>14.2} {:>14.2} {:>10.0} {:>7.2} {:>4} {:>4} {:>4} {:>4}",
            format_time(r.tstart),
            format_time(r.tstop),
            r.tstart,
            r.tstop,
            r.simpos,
            r.pitch,
            r.ccd_count,
            r.fep_count,
            r.vid_board,
            r.clocking
        );
    }
    write_file(&outdir.join(STATES_FILE), &out)
}

/// Terminal summary of a finished check.
pub fn render_summary(summary: &CheckSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        "🌡️ ".bright_blue(),
        format!("{} thermal check", summary.msid).bright_blue().bold()
    );
    let _ = writeln!(
        out,
        "{} {:.1} C   {} {:.1} C",
        "Yellow:".bright_white(),
        summary.yellow,
        "Planning:".bright_white(),
        summary.planning_limit
    );

    if let Some(pred) = &summary.prediction {
        let _ = writeln!(
            out,
            "{} {} to {}, max {:.2} C",
            "Prediction:".bright_white(),
            pred.datestart,
            pred.datestop,
            pred.max_temp
        );
        if pred.violations.is_empty() {
            let _ = writeln!(out, "  {} {}", "✅".green(), "No planning limit violations".bright_green());
        }
        for v in &pred.violations {
            let _ = writeln!(
                out,
                "  {} {} to {} max {:.2} C",
                "❌ VIOLATION".bright_red().bold(),
                v.datestart,
                v.datestop,
                v.max_temp
            );
        }
        if pred.yellow_exceeded {
            let _ = writeln!(out, "  {}", "Yellow limit exceeded".red().bold());
        }
    }

    if let Some(val) = &summary.validation {
        let _ = writeln!(
            out,
            "{} {} to {}",
            "Validation:".bright_white(),
            val.datestart,
            val.datestop
        );
        for m in &val.msids {
            for c in &m.checks {
                let status = if c.violated { "FAIL".bright_red() } else { "ok".green() };
                let _ = writeln!(
                    out,
                    "  {:<12} {:>3}% {:>8.2} (limit {:.2}) {}",
                    m.msid.as_str(),
                    c.percentile,
                    c.value,
                    c.limit,
                    status
                );
            }
        }
    }

    out
}

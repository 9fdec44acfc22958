//! Command-line options shared by thermal checks.

use crate::time::parse_time;
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTDIR: &str = "out";
pub const DEFAULT_VALIDATION_DAYS: f64 = 21.0;

/// Settings for one check run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    pub outdir: PathBuf,
    pub model_spec: PathBuf,
    /// States of the load under review.
    pub states: Option<PathBuf>,
    /// States covering the validation period.
    pub history_states: Option<PathBuf>,
    pub telemetry: Option<PathBuf>,
    pub run_start: Option<f64>,
    pub days: f64,
    pub t_init: Option<f64>,
    pub traceback: bool,
    pub verbose: u8,
}

impl CheckOptions {
    pub fn new(outdir: impl Into<PathBuf>, model_spec: impl Into<PathBuf>) -> Self {
        Self {
            outdir: outdir.into(),
            model_spec: model_spec.into(),
            states: None,
            history_states: None,
            telemetry: None,
            run_start: None,
            days: DEFAULT_VALIDATION_DAYS,
            t_init: None,
            traceback: false,
            verbose: 1,
        }
    }
}

/// Default model spec file for a check, `<model_path>/<name>_model_spec.json`.
pub fn default_model_spec(name: &str, model_path: &Path) -> PathBuf {
    model_path.join(format!("{name}_model_spec.json"))
}

fn build_app<'a, 'b>(msid: &str, about: &'b str) -> App<'a, 'b> {
    App::new(format!("{}_check", msid.to_lowercase()))
        .version(env!("CARGO_PKG_VERSION"))
        .about(about)
        .arg(
            Arg::with_name("outdir")
                .long("outdir")
                .value_name("DIR")
                .help("Output directory")
                .takes_value(true)
                .default_value(DEFAULT_OUTDIR),
        )
        .arg(
            Arg::with_name("states")
                .long("states")
                .value_name("FILE")
                .help("JSON states of the load to review")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("history-states")
                .long("history-states")
                .value_name("FILE")
                .help("JSON states covering the validation period")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("telemetry")
                .long("telemetry")
                .value_name("FILE")
                .help("JSON telemetry keyed by lower-case MSID")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("model-spec")
                .long("model-spec")
                .value_name("FILE")
                .help("Model specification file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("run-start")
                .long("run-start")
                .value_name("DATE")
                .help("Reference time (YYYY:DOY:HH:MM:SS or CXC seconds)")
                .takes_value(true)
                .validator(|v| parse_time(&v).map(|_| ()).map_err(|e| e.to_string())),
        )
        .arg(
            Arg::with_name("days")
                .long("days")
                .value_name("DAYS")
                .help("Days of validation data")
                .takes_value(true)
                .default_value("21")
                .validator(|v| match v.parse::<f64>() {
                    Ok(days) if days > 0.0 => Ok(()),
                    _ => Err("Days must be a positive number".into()),
                }),
        )
        .arg(
            Arg::with_name("T-init")
                .long("T-init")
                .value_name("DEGC")
                .help("Starting temperature, overrides telemetry")
                .takes_value(true)
                .validator(|v| match v.parse::<f64>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Temperature must be a number".into()),
                }),
        )
        .arg(
            Arg::with_name("traceback")
                .long("traceback")
                .help("Report errors with full detail instead of a one-line message"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .value_name("LEVEL")
                .help("Verbosity (0=quiet, 1=normal, 2=debug)")
                .takes_value(true)
                .default_value("1")
                .possible_values(&["0", "1", "2"]),
        )
}

fn invalid_value(message: &str) -> clap::Error {
    clap::Error::with_description(message, clap::ErrorKind::InvalidValue)
}

fn parse_number(matches: &ArgMatches<'_>, name: &str) -> Result<Option<f64>, clap::Error> {
    matches
        .value_of(name)
        .map(|v| v.parse::<f64>().map_err(|_| invalid_value(&format!("invalid --{name}: {v}"))))
        .transpose()
}

/// Parses options from an explicit argument list (first item is the program).
pub fn get_options_from<I, T>(
    msid: &str,
    name: &str,
    model_path: &Path,
    args: I,
) -> Result<CheckOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let about = format!("Load review and model validation for {msid}");
    let matches = build_app(msid, &about).get_matches_from_safe(args)?;

    let model_spec = matches
        .value_of("model-spec")
        .map_or_else(|| default_model_spec(name, model_path), PathBuf::from);
    let mut opts = CheckOptions::new(matches.value_of("outdir").unwrap_or(DEFAULT_OUTDIR), model_spec);

    opts.states = matches.value_of("states").map(PathBuf::from);
    opts.history_states = matches.value_of("history-states").map(PathBuf::from);
    opts.telemetry = matches.value_of("telemetry").map(PathBuf::from);
    opts.run_start = matches
        .value_of("run-start")
        .map(|v| parse_time(v).map_err(|e| invalid_value(&e.to_string())))
        .transpose()?;
    opts.days = parse_number(&matches, "days")?.unwrap_or(DEFAULT_VALIDATION_DAYS);
    opts.t_init = parse_number(&matches, "T-init")?;
    opts.traceback = matches.is_present("traceback");
    opts.verbose = matches
        .value_of("verbose")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    Ok(opts)
}

/// Parses the process arguments, exiting with usage on error.
pub fn get_options(msid: &str, name: &str, model_path: &Path) -> CheckOptions {
    get_options_from(msid, name, model_path, std::env::args_os()).unwrap_or_else(|e| e.exit())
}

use bep_pcb_check::cli::{run_driver, ExitStatus};
use bep_pcb_check::check::report::render_summary;
use bep_pcb_check::options::get_options;
use bep_pcb_check::{bep_pcb_check, model_path, CheckError, Signal};
use tracing::Level;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), CheckError> {
    let signal = Signal::BepPcb;
    let opts = get_options(signal.msid(), signal.name(), &model_path());
    init_tracing(opts.verbose);

    let check = bep_pcb_check();
    let outcome = run_driver(&check, &opts, &mut std::io::stderr())?;

    if let Some(summary) = &outcome.summary {
        if opts.verbose > 0 {
            print!("{}", render_summary(summary));
        }
    }
    if outcome.status == ExitStatus::Failure {
        std::process::exit(outcome.status.code());
    }
    Ok(())
}

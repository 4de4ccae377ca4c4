mod args;
mod report;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

fn main() {
    let args = args::Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    info!("args: {:?}", args);

    if let Err(e) = report::run_report(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

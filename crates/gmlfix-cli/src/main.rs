//! gmlfix CLI entry point.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use gmlfix::GmlfixError;
use gmlfix_cli::{Args, error_adapter::to_reportables};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"); "Starting gmlfix");
    debug!(args:?; "Parsed arguments");

    match gmlfix_cli::run(&args) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr at `level`, falling back to `warn` for unknown names.
fn init_logger(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
}

/// Render every diagnostic of `err` as its own miette report.
fn report_error(err: &GmlfixError) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut writer = String::new();
        match reporter.render_report(&mut writer, reportable.as_ref()) {
            Ok(()) => error!("{writer}"),
            Err(_) => error!("{reportable}"),
        }
    }
}

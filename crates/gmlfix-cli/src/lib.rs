//! CLI logic for the gmlfix tool.
//!
//! Reads a GML document, normalizes its node records, and writes the result
//! to standard output, to a separate file, or back over the input.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use log::{info, warn};
use tempfile::NamedTempFile;

use gmlfix::{GmlfixError, Normalizer};

use error_adapter::diagnostics_to_reportables;

/// Run the gmlfix CLI application
///
/// This function reads the input document, normalizes it, reports any
/// recovered problems as warnings, and writes the normalized document.
///
/// # Errors
///
/// Returns `GmlfixError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Warnings promoted to errors in strict mode
pub fn run(args: &Args) -> Result<(), GmlfixError> {
    info!(
        input_path = args.input,
        output_path:? = args.destination();
        "Processing document"
    );

    if args.in_place && args.reads_stdin() {
        return Err(GmlfixError::Config(
            "standard input cannot be rewritten in place".to_string(),
        ));
    }

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.strict {
        app_config = app_config.with_strict(true);
    }

    let source = read_input(args)?;

    let normalizer = Normalizer::new(app_config);
    let normalized = normalizer.normalize(&source)?;

    report_warnings(normalized.warnings(), &source);

    match args.destination() {
        Some(path) => {
            write_atomically(Path::new(path), normalized.text())?;
            info!(output_file = path; "Normalized document written");
            println!("{path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(normalized.text().as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn read_input(args: &Args) -> Result<String, GmlfixError> {
    if args.reads_stdin() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(&args.input)?)
    }
}

/// Render recovered problems through miette at `warn` level.
fn report_warnings(warnings: &[gmlfix::Diagnostic], source: &str) {
    if warnings.is_empty() {
        return;
    }

    let reporter = miette::GraphicalReportHandler::new();
    for reportable in diagnostics_to_reportables(warnings, source) {
        let mut writer = String::new();
        if reporter.render_report(&mut writer, reportable.as_ref()).is_ok() {
            warn!("{writer}");
        } else {
            warn!("{reportable}");
        }
    }
}

/// Write `contents` to a temporary file next to `path`, then rename it over
/// `path`. The destination is never left half written.
fn write_atomically(path: &Path, contents: &str) -> Result<(), GmlfixError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|err| GmlfixError::Io(err.error))?;

    Ok(())
}

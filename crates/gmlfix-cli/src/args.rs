//! Command-line argument definitions for the gmlfix CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document, where the normalized
//! document goes, the configuration file and logging verbosity.

use clap::Parser;

/// Input path that stands for standard input.
pub const STDIN: &str = "-";

/// Command-line arguments for the gmlfix tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input GML file, `-` for standard input
    #[arg(help = "Path to the input file, `-` reads standard input")]
    pub input: String,

    /// Path to write the normalized document to; standard output if omitted
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<String>,

    /// Overwrite the input file with the normalized document
    #[arg(short, long)]
    pub in_place: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Whether the input is read from standard input.
    pub fn reads_stdin(&self) -> bool {
        self.input == STDIN
    }

    /// The file the normalized document is written to, `None` for standard
    /// output.
    pub fn destination(&self) -> Option<&str> {
        if self.in_place {
            Some(&self.input)
        } else {
            self.output.as_deref()
        }
    }
}

//! Error types for gmlfix operations.

use std::io;

use thiserror::Error;

use gmlfix_parser::error::ParseError;

/// The main error type for gmlfix operations.
///
/// The `Parse` variant carries the diagnostics of a failed strict run
/// together with the source they point into, so callers can render the
/// offending lines.
#[derive(Debug, Error)]
pub enum GmlfixError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GmlfixError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

//! Configuration types for GML normalization.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file by the command-line tool.
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`NormalizeConfig`] - How node records are rewritten.
//! - [`OutputConfig`] - How the normalized document is written.
//!
//! # Example
//!
//! ```
//! # use gmlfix::config::{AppConfig, LineEndingConfig};
//! let config = AppConfig::default();
//! assert!(!config.normalize().strict());
//! assert_eq!(config.normalize().indent_unit(), "  ");
//! assert_eq!(config.output().line_ending(), LineEndingConfig::Auto);
//! ```

use std::ops::RangeInclusive;

use serde::Deserialize;

use gmlfix_parser::LineEnding;

use crate::assemble::Terminators;

const DEFAULT_INDENT_WIDTH: usize = 2;

/// Accepted values of `normalize.indent_width`.
pub const INDENT_WIDTH_RANGE: RangeInclusive<usize> = 1..=16;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Normalization section.
    #[serde(default)]
    normalize: NormalizeConfig,

    /// Output section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(normalize: NormalizeConfig, output: OutputConfig) -> Self {
        Self { normalize, output }
    }

    /// Returns the normalization configuration.
    pub fn normalize(&self) -> &NormalizeConfig {
        &self.normalize
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns this configuration with strict mode switched on or off.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.normalize.strict = strict;
        self
    }

    /// Check the values deserialization alone does not constrain.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        let width = self.normalize.indent_width;
        if !INDENT_WIDTH_RANGE.contains(&width) {
            return Err(format!(
                "normalize.indent_width must be between {} and {}, got {width}",
                INDENT_WIDTH_RANGE.start(),
                INDENT_WIDTH_RANGE.end()
            ));
        }
        Ok(())
    }
}

/// Controls how node records are rewritten.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    /// Treat every warning as an error and fail the run.
    #[serde(default)]
    strict: bool,

    /// Spaces per nesting level for lines gmlfix adds to a record.
    #[serde(default = "default_indent_width")]
    indent_width: usize,
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            strict: false,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl NormalizeConfig {
    /// Creates a new [`NormalizeConfig`].
    ///
    /// # Arguments
    ///
    /// * `strict` - Whether warnings fail the run.
    /// * `indent_width` - Spaces per nesting level for added lines.
    pub fn new(strict: bool, indent_width: usize) -> Self {
        Self {
            strict,
            indent_width,
        }
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// One level of indentation, as inserted in front of added lines.
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

/// Controls how the normalized document is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    line_ending: LineEndingConfig,
}

impl OutputConfig {
    pub fn new(line_ending: LineEndingConfig) -> Self {
        Self { line_ending }
    }

    pub fn line_ending(&self) -> LineEndingConfig {
        self.line_ending
    }
}

/// Line terminators of the output document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingConfig {
    /// Keep every source line's own terminator; new lines use the one
    /// detected in the input.
    #[default]
    Auto,
    Lf,
    Crlf,
}

impl LineEndingConfig {
    /// How to terminate lines, given the convention detected in the input.
    pub fn resolve(self, detected: LineEnding) -> Terminators {
        match self {
            LineEndingConfig::Auto => Terminators::Keep { fallback: detected },
            LineEndingConfig::Lf => Terminators::Uniform(LineEnding::Lf),
            LineEndingConfig::Crlf => Terminators::Uniform(LineEnding::CrLf),
        }
    }
}
